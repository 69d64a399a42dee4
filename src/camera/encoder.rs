//! # 编码模块
//!
//! ## 设计思路
//!
//! 把变换后的位图编码为对外可传输的字节，编码失败属于终态错误，不重试。
//!
//! ## 实现思路
//!
//! - PNG 无损，忽略 `quality`，按 RGBA8 输出。
//! - JPEG 不支持透明通道，按 RGB8 输出；`quality / 100` 钳制到 `[0.0, 1.0]`
//!   后映射到编码器的 1..=100 刻度。
//! - 零面积位图或编码器未产出字节时返回 `EncodingFailed`。

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::source::{EncodedArtifact, RawBitmap};
use super::{CameraError, Encoding};

/// JPEG 编码器使用的小数质量。
pub fn compression_quality(quality: u8) -> f32 {
    (quality as f32 / 100.0).clamp(0.0, 1.0)
}

/// 按请求格式编码位图。
pub fn encode_bitmap(
    bitmap: &RawBitmap,
    encoding: Encoding,
    quality: u8,
) -> Result<EncodedArtifact, CameraError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(CameraError::EncodingFailed(format!(
            "位图面积为零：{}x{}",
            width, height
        )));
    }

    let mut buffer = Cursor::new(Vec::new());

    match encoding {
        Encoding::Png => {
            let rgba = bitmap.image.to_rgba8();
            PngEncoder::new(&mut buffer)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| CameraError::EncodingFailed(format!("PNG 编码失败：{}", e)))?;
        }
        Encoding::Jpeg => {
            // JPEG 不支持透明通道
            let rgb = bitmap.image.to_rgb8();
            let codec_quality = ((compression_quality(quality) * 100.0).round() as u8).clamp(1, 100);
            JpegEncoder::new_with_quality(&mut buffer, codec_quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| CameraError::EncodingFailed(format!("JPEG 编码失败：{}", e)))?;
        }
    }

    let bytes = buffer.into_inner();
    if bytes.is_empty() {
        return Err(CameraError::EncodingFailed("编码器未产出任何字节".to_string()));
    }

    Ok(EncodedArtifact::new(bytes, encoding, width, height))
}
