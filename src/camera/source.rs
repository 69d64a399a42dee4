//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部采集语义”和“流水线中间结果”解耦：
//! - `AcquisitionKind` / `AcquisitionOutcome` 表示采集来源与其终态
//! - `RawBitmap` 表示已解码、尚未变换的位图（流水线独占所有权）
//! - `EncodedArtifact` 表示编码后的不可变字节
//! - `CaptureResponse` / `CleanupReport` 是对外响应记录

use std::fmt;

use image::{DynamicImage, GenericImageView};
use serde::Serialize;

use super::{CameraError, Encoding};

/// 采集来源类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionKind {
    /// 实时拍摄设备。
    Camera,
    /// 已有媒体库。
    Library,
}

impl AcquisitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Library => "library",
        }
    }
}

/// 采集来源最终给出的三种结果之一。
pub enum AcquisitionOutcome {
    Bitmap(RawBitmap),
    Cancelled,
    Failed(CameraError),
}

impl fmt::Debug for AcquisitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitmap(bitmap) => write!(f, "Bitmap({}x{})", bitmap.width(), bitmap.height()),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failed(err) => write!(f, "Failed({})", err),
        }
    }
}

/// EXIF 风格的方向标记（取值 1..=8）。
///
/// 变体名描述“把像素缓冲画成正向”所需的变换。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// 1：已是正向。
    #[default]
    Up,
    /// 2：水平镜像。
    UpMirrored,
    /// 3：旋转 180°。
    Down,
    /// 4：垂直镜像。
    DownMirrored,
    /// 5：顺时针 90° 后水平镜像。
    LeftMirrored,
    /// 6：需顺时针 90°。
    Right,
    /// 7：顺时针 270° 后水平镜像。
    RightMirrored,
    /// 8：需顺时针 270°。
    Left,
}

impl Orientation {
    /// 从 EXIF 数值解析，未知值按正向处理。
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => Self::Up,
        }
    }

    pub fn exif_value(self) -> u32 {
        match self {
            Self::Up => 1,
            Self::UpMirrored => 2,
            Self::Down => 3,
            Self::DownMirrored => 4,
            Self::LeftMirrored => 5,
            Self::Right => 6,
            Self::RightMirrored => 7,
            Self::Left => 8,
        }
    }

    pub fn is_upright(self) -> bool {
        self == Self::Up
    }
}

/// 采集来源产出的已解码位图。
#[derive(Debug, Clone)]
pub struct RawBitmap {
    pub image: DynamicImage,
    pub orientation: Orientation,
    /// 显示缩放系数（点与像素之比），变换过程中原样保留。
    pub scale: f32,
}

impl RawBitmap {
    /// 正向、缩放系数 1.0 的位图。
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::Up,
            scale: 1.0,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// 编码阶段输出，生成后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    format: Encoding,
    width: u32,
    height: u32,
}

impl EncodedArtifact {
    pub(crate) fn new(bytes: Vec<u8>, format: Encoding, width: u32, height: u32) -> Self {
        Self {
            bytes,
            format,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> Encoding {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// 成功响应：`{ imageData, width, height, format }`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    /// Base64 字符串或 `file://` URI。
    pub image_data: String,
    pub width: u32,
    pub height: u32,
    /// `"jpeg"` 或 `"png"`。
    pub format: &'static str,
}

/// 清理操作响应：`{ cleaned }`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub cleaned: usize,
}
