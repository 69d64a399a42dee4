//! # 采集来源模块
//!
//! ## 设计思路
//!
//! 采集设备本身（相机硬件、相册选择界面、权限弹窗）属于外部协作方，
//! 这里只把它抽象成一个异步能力：给定来源类型，最终产出
//! `Bitmap` / `Cancelled` / `Failed` 三者之一。
//!
//! ## 实现思路
//!
//! - `AcquisitionSource` 用 `impl Future` 返回值表达异步结果，替代回调 + 共享字段。
//! - `FileLibrarySource` 是面向文件系统的“相册”实现：
//!   签名校验（`infer`）→ 头部尺寸预检 → 完整解码 → 读取 EXIF 方向。
//!   未选择文件视为用户取消；请求 `camera` 返回 `SourceUnavailable`。
//! - 解码在阻塞线程池上执行，避免占用异步运行时。

use std::future::Future;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use image::ImageReader;

use super::source::{AcquisitionKind, AcquisitionOutcome, Orientation, RawBitmap};
use super::CameraError;

/// 外部采集来源。
pub trait AcquisitionSource: Send + Sync + 'static {
    /// 展示采集界面并等待唯一的终态结果。
    fn acquire(&self, kind: AcquisitionKind) -> impl Future<Output = AcquisitionOutcome> + Send;
}

/// 基于本地文件的媒体库来源。
#[derive(Debug, Clone)]
pub struct FileLibrarySource {
    selection: Option<PathBuf>,
    max_decoded_pixels: u64,
}

impl FileLibrarySource {
    /// `selection` 为空表示用户未选择任何文件。
    pub fn new(selection: Option<PathBuf>, max_decoded_pixels: u64) -> Self {
        Self {
            selection,
            max_decoded_pixels,
        }
    }

    /// 同步读取并解码文件。
    pub fn load(path: &Path, max_decoded_pixels: u64) -> Result<RawBitmap, CameraError> {
        log::info!("📁 开始读取图库图片 - 路径: {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(format!("无法读取 '{}'：{}", path.display(), e))
            }
            _ => CameraError::DecodeUnavailable(format!("无法读取图片文件 '{}'：{}", path.display(), e)),
        })?;

        Self::validate_image_signature(&bytes)?;

        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| CameraError::DecodeUnavailable(format!("无法识别图片格式：{}", e)))?
            .into_dimensions()
            .map_err(|e| CameraError::DecodeUnavailable(format!("无法读取图片尺寸：{}", e)))?;

        let pixels = (width as u64) * (height as u64);
        if pixels > max_decoded_pixels {
            return Err(CameraError::DecodeUnavailable(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, max_decoded_pixels
            )));
        }

        let image = image::load_from_memory(&bytes)
            .map_err(|e| CameraError::DecodeUnavailable(format!("图片解码失败：{}", e)))?;
        let orientation = Orientation::from_exif(read_exif_orientation(&bytes));

        log::info!(
            "✅ 图库图片解码成功 - 尺寸: {}x{} 方向: {}",
            width,
            height,
            orientation.exif_value()
        );

        Ok(RawBitmap::new(image).with_orientation(orientation))
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), CameraError> {
        if bytes.is_empty() {
            return Err(CameraError::DecodeUnavailable("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| CameraError::DecodeUnavailable("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(CameraError::DecodeUnavailable(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}

impl AcquisitionSource for FileLibrarySource {
    fn acquire(&self, kind: AcquisitionKind) -> impl Future<Output = AcquisitionOutcome> + Send {
        let selection = self.selection.clone();
        let max_decoded_pixels = self.max_decoded_pixels;

        async move {
            if kind == AcquisitionKind::Camera {
                return AcquisitionOutcome::Failed(CameraError::SourceUnavailable(
                    "当前环境没有可用的拍摄设备".to_string(),
                ));
            }

            let Some(path) = selection else {
                log::info!("🙅 未选择任何图片，视为用户取消");
                return AcquisitionOutcome::Cancelled;
            };

            let loaded =
                tokio::task::spawn_blocking(move || Self::load(&path, max_decoded_pixels)).await;

            match loaded {
                Ok(Ok(bitmap)) => AcquisitionOutcome::Bitmap(bitmap),
                Ok(Err(err)) => AcquisitionOutcome::Failed(err),
                Err(join_err) => AcquisitionOutcome::Failed(CameraError::StateCorrupted(format!(
                    "图片读取任务异常退出：{}",
                    join_err
                ))),
            }
        }
    }
}

/// 读取 EXIF 方向标记，缺失时返回 1（正向）。
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(reader) => reader,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}
