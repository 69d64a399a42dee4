//! # 相机采集模块（camera）
//!
//! ## 设计思路
//!
//! 该模块把“发起采集 → 等待外部来源 → 方向归一 → 缩放 → 编码 → 输出”
//! 按职责拆分为多个子模块，核心约束只有两条：
//! - 任意时刻至多一个进行中的请求，且每个请求恰好收到一次终态响应
//! - 临时产物命名 `<prefix><毫秒时间戳>.<ext>` 不可改动，清理逻辑依赖它
//!
//! - `service`：承载可注入状态（`CameraService`）
//! - `tracker`：单请求跟踪（`begin` / `complete`）
//! - `acquisition`：外部采集来源抽象与文件实现
//! - `handler`：编排后处理流水线
//! - `orientation` / `resize` / `encoder` / `emitter`：流水线四个阶段
//! - `janitor`：临时产物清理
//! - `gallery`：相册保存（尽力而为）
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 宿主（main.rs / 上层应用）
//!    ↓
//! service.rs（解析参数、登记请求、等待终态）
//!    ├─ tracker.rs（begin：拒绝并发请求）
//!    ├─ acquisition.rs（相机 / 媒体库，可能取消或失败）
//!    ↓
//! handler.rs（阻塞线程池 + 阶段耗时日志）
//!    ├─ orientation.rs（按方向标记重绘为正向）
//!    ├─ resize.rs（等比 / 拉伸缩放）
//!    ├─ encoder.rs（JPEG / PNG）
//!    └─ emitter.rs（Base64 / 临时文件 URI）
//!    ↓
//! tracker.rs（complete：投递唯一终态并清空）
//! ```
//!
//! ## 分层职责建议
//!
//! - 请求参数字段变更优先改 `config.rs`
//! - 并发与终态投递问题优先看 `tracker.rs` 与 `service.rs`
//! - 单阶段行为调整分别改 `orientation/resize/encoder/emitter`
//! - 临时目录清理问题看 `janitor.rs`，注意与 `emitter.rs` 的命名约定保持一致

mod acquisition;
mod config;
mod emitter;
mod encoder;
mod error;
mod gallery;
mod handler;
mod janitor;
mod orientation;
mod resize;
mod service;
mod source;
mod tracker;

pub use acquisition::{AcquisitionSource, FileLibrarySource, read_exif_orientation};
pub use config::{
    CameraConfig, CameraOptions, DEFAULT_FILE_PREFIX, DEFAULT_QUALITY, Encoding, PerformanceProfile,
    ReturnType, TEMP_SUBDIR,
};
pub use emitter::{ArtifactEmitter, TempArtifactRef};
pub use encoder::{compression_quality, encode_bitmap};
pub use error::CameraError;
pub use gallery::{DirectoryGallerySink, GALLERY_FILE_PREFIX, GallerySink};
pub use handler::CapturePipeline;
pub use janitor::TempArtifactJanitor;
pub use orientation::normalize_orientation;
pub use resize::compute_target_dimensions;
pub use service::CameraService;
pub use source::{
    AcquisitionKind, AcquisitionOutcome, CaptureResponse, CleanupReport, EncodedArtifact,
    Orientation, RawBitmap,
};
pub use tracker::{CaptureOutcome, RequestId, RequestTracker};
