//! 相册保存。
//!
//! 仅在主响应成功且 `saveToGallery` 为真时调用，保存的是未经方向/缩放处理的原始位图。
//! 失败不影响主响应，由服务层记录日志后丢弃。

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::source::RawBitmap;
use super::CameraError;

/// 相册文件名前缀。
pub const GALLERY_FILE_PREFIX: &str = "SLM_Camera_";
const GALLERY_JPEG_QUALITY: u8 = 100;

/// 系统相册的抽象。
pub trait GallerySink: Send + Sync + 'static {
    /// 保存原始位图，返回保存位置。
    fn save(&self, bitmap: &RawBitmap) -> Result<PathBuf, CameraError>;
}

/// 以目录充当相册。
#[derive(Debug, Clone)]
pub struct DirectoryGallerySink {
    dir: PathBuf,
}

impl DirectoryGallerySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl GallerySink for DirectoryGallerySink {
    fn save(&self, bitmap: &RawBitmap) -> Result<PathBuf, CameraError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CameraError::FileWriteFailed(format!("无法创建相册目录 '{}'：{}", self.dir.display(), e))
        })?;

        let (width, height) = bitmap.dimensions();
        let rgb = bitmap.image.to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, GALLERY_JPEG_QUALITY)
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| CameraError::EncodingFailed(format!("相册 JPEG 编码失败：{}", e)))?;

        let path = self.dir.join(format!(
            "{}{}.jpg",
            GALLERY_FILE_PREFIX,
            chrono::Utc::now().timestamp_millis()
        ));
        fs::write(&path, &bytes).map_err(|e| {
            CameraError::FileWriteFailed(format!("写入相册文件 '{}' 失败：{}", path.display(), e))
        })?;

        log::info!("🖼️ 原图已保存到相册：{}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbaImage};

    #[test]
    fn saves_original_as_jpeg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectoryGallerySink::new(dir.path().join("DCIM"));
        let bitmap = RawBitmap::new(DynamicImage::ImageRgba8(RgbaImage::new(30, 20)));

        let path = sink.save(&bitmap).expect("save to gallery");

        let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with(GALLERY_FILE_PREFIX));
        assert!(name.ends_with(".jpg"));
        let decoded = image::open(&path).expect("gallery jpeg decodes");
        assert_eq!(decoded.dimensions(), (30, 20));
    }

    #[test]
    fn blocked_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").expect("write");

        let sink = DirectoryGallerySink::new(blocker.join("DCIM"));
        let bitmap = RawBitmap::new(DynamicImage::ImageRgba8(RgbaImage::new(2, 2)));
        assert!(matches!(sink.save(&bitmap), Err(CameraError::FileWriteFailed(_))));
    }
}
