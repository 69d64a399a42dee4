//! # 相机采集工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              宿主 (main.rs CLI / 上层应用)                 │
//! │                                                          │
//! │  capture ── cleanup ── info                              │
//! │       │  (Result<T, AppError>，错误序列化为单条消息)       │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↓
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            库 (Rust)                             │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ camera ───── 单请求采集 + 四阶段后处理                 │
//! │  │   ├─ tracker        begin / complete（恰好一次）       │
//! │  │   ├─ acquisition    相机 / 媒体库来源                  │
//! │  │   ├─ handler        方向 → 缩放 → 编码 → 输出          │
//! │  │   └─ janitor        按前缀清理临时产物                 │
//! │  │                                                       │
//! │  ├─ settings           JSON 设置 → CameraConfig           │
//! │  └─ storage            临时目录解析与占用统计             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，宿主层的返回类型 |
//! | [`camera`] | 采集请求跟踪、图片后处理流水线、临时产物输出与清理 |
//! | [`settings`] | 读取 / 写入宿主设置文件并叠加到默认配置 |
//! | [`storage`] | 临时目录的获取、自动创建与占用统计 |

pub mod camera;
pub mod error;
pub mod settings;
pub mod storage;
