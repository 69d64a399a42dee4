//! # 尺寸变换模块
//!
//! ## 设计思路
//!
//! 目标尺寸的计算是纯函数（`compute_target_dimensions`），与真正的重绘分开，
//! 便于在不构造图像的情况下验证策略。
//!
//! ## 实现思路
//!
//! 策略按顺序判定：
//! 1. 宽高都指定：精确输出 `(w, h)`，不保持比例（调用方有意拉伸）
//! 2. 仅指定宽：高度按比例 `round(h * tw / w)`
//! 3. 仅指定高：宽度按比例 `round(w * th / h)`
//! 4. 都未指定：原图返回，不重绘
//!
//! 计算结果为 0 时钳制到 1。输出像素数超过 `max_decoded_pixels` 时返回
//! `ResizeFailed`，不分配缓冲。
//!
//! 重绘优先走 `fast_image_resize`（直接在 `DynamicImage` 上按原色彩类型卷积，
//! 带透明通道时先预乘 alpha），不支持的像素类型或失败时回退
//! `image::resize_exact`；两者都是单一缩放变换，不裁剪、不留边。

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::DynamicImage;

use super::handler::CapturePipeline;
use super::source::RawBitmap;
use super::CameraError;

/// 计算输出尺寸；返回 `None` 表示无需重绘。
///
/// # 示例
/// ```rust,no_run
/// use slm_camera::camera::compute_target_dimensions;
///
/// assert_eq!(compute_target_dimensions((400, 800), 200, 0), Some((200, 400)));
/// assert_eq!(compute_target_dimensions((400, 800), 0, 0), None);
/// ```
pub fn compute_target_dimensions(
    original: (u32, u32),
    target_width: u32,
    target_height: u32,
) -> Option<(u32, u32)> {
    let (width, height) = original;

    // 零面积位图无法按比例换算，交给编码阶段报错。
    if width == 0 || height == 0 {
        return None;
    }

    let (new_width, new_height) = match (target_width, target_height) {
        (0, 0) => return None,
        (tw, 0) => (tw, scale_edge(height, tw, width)),
        (0, th) => (scale_edge(width, th, height), th),
        (tw, th) => (tw, th),
    };

    Some((new_width.max(1), new_height.max(1)))
}

/// `round(edge * numerator / denominator)`，结果至少为 1。
fn scale_edge(edge: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (edge as f64 * numerator as f64 / denominator as f64).round();
    scaled.clamp(1.0, u32::MAX as f64) as u32
}

impl CapturePipeline {
    /// 按目标尺寸重绘位图；未指定目标时原样返回。
    pub(crate) fn resize_to_target(
        &self,
        bitmap: RawBitmap,
        target_width: u32,
        target_height: u32,
    ) -> Result<RawBitmap, CameraError> {
        let (width, height) = bitmap.dimensions();
        let Some((new_width, new_height)) =
            compute_target_dimensions((width, height), target_width, target_height)
        else {
            log::debug!("📐 无需缩放：{}x{}", width, height);
            return Ok(bitmap);
        };

        if (new_width, new_height) == (width, height) {
            log::debug!("📐 目标尺寸与原图一致：{}x{}", width, height);
            return Ok(bitmap);
        }

        let output_pixels = new_width as u64 * new_height as u64;
        if output_pixels > self.config.max_decoded_pixels {
            return Err(CameraError::ResizeFailed(format!(
                "目标尺寸 {}x{} 共 {} 像素，超过上限 {} 像素",
                new_width, new_height, output_pixels, self.config.max_decoded_pixels
            )));
        }

        let filter = self.config.resize_filter;
        log::info!(
            "📐 缩放：{}x{} -> {}x{}（filter={:?} fast={}）",
            width,
            height,
            new_width,
            new_height,
            filter,
            self.config.fast_resize
        );

        let RawBitmap {
            image,
            orientation,
            scale,
        } = bitmap;

        let redrawn = if self.config.fast_resize {
            redraw_with_convolution(&image, new_width, new_height, filter).unwrap_or_else(|err| {
                log::warn!("⚠️ 卷积缩放不可用，回退 image::resize_exact：{}", err);
                image.resize_exact(new_width, new_height, filter)
            })
        } else {
            image.resize_exact(new_width, new_height, filter)
        };

        Ok(RawBitmap {
            image: redrawn,
            orientation,
            scale,
        })
    }
}

/// 保持源色彩类型，直接写入同类型的目标位图。
fn redraw_with_convolution(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DynamicImage, CameraError> {
    let mut redrawn = DynamicImage::new(width, height, image.color());
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(convolution_filter(filter)))
        .use_alpha(image.color().has_alpha());

    fr::Resizer::new()
        .resize(image, &mut redrawn, &options)
        .map_err(|e| CameraError::ResizeFailed(e.to_string()))?;

    Ok(redrawn)
}

fn convolution_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Gaussian,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
