//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `CapturePipeline` 只负责把一张已采集的位图变成响应记录，不关心位图从哪里来。
//! 处理链路固定为：
//! 1. 方向归一（`correctOrientation` 为真时）
//! 2. 按目标尺寸缩放
//! 3. 编码为 JPEG / PNG
//! 4. 按传输方式输出（Base64 或临时文件 URI）
//!
//! ## 实现思路
//!
//! - 全部是同步代码，由服务层放到阻塞线程池上执行。
//! - 位图按值在阶段之间传递，流水线独占所有权。
//! - 记录 `orient/resize/encode/emit/total` 阶段耗时，便于性能诊断。
//! - 任一阶段失败即终止，不重试。

use std::time::Instant;

use super::emitter::ArtifactEmitter;
use super::encoder::encode_bitmap;
use super::orientation::normalize_orientation;
use super::source::{CaptureResponse, RawBitmap};
use super::{CameraConfig, CameraError, CameraOptions};

/// 采集后处理流水线。
#[derive(Debug, Clone)]
pub struct CapturePipeline {
    pub(super) config: CameraConfig,
    emitter: ArtifactEmitter,
}

impl CapturePipeline {
    /// 根据宿主配置创建流水线。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use slm_camera::camera::{CameraConfig, CapturePipeline};
    ///
    /// let pipeline = CapturePipeline::new(CameraConfig::default());
    /// assert!(pipeline.config().fast_resize);
    /// ```
    pub fn new(config: CameraConfig) -> Self {
        let emitter = ArtifactEmitter::new(config.temp_dir.clone(), config.file_prefix.clone());
        Self { config, emitter }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn emitter(&self) -> &ArtifactEmitter {
        &self.emitter
    }

    /// 处理主入口：方向 → 缩放 → 编码 → 输出。
    pub fn process(
        &self,
        bitmap: RawBitmap,
        options: &CameraOptions,
    ) -> Result<CaptureResponse, CameraError> {
        let total_start = Instant::now();
        let (source_width, source_height) = bitmap.dimensions();

        let orient_start = Instant::now();
        let bitmap = if options.correct_orientation {
            normalize_orientation(bitmap)
        } else {
            bitmap
        };
        let orient_elapsed = orient_start.elapsed();

        let resize_start = Instant::now();
        let bitmap = if options.wants_resize() {
            self.resize_to_target(bitmap, options.target_width, options.target_height)?
        } else {
            bitmap
        };
        let resize_elapsed = resize_start.elapsed();

        let encode_start = Instant::now();
        let artifact = encode_bitmap(&bitmap, options.encoding, options.quality)?;
        drop(bitmap);
        let encode_elapsed = encode_start.elapsed();

        let emit_start = Instant::now();
        let response = self.emitter.emit(&artifact, options.return_type)?;
        let emit_elapsed = emit_start.elapsed();

        log::info!(
            "✅ 图片处理完成 - {}x{} -> {}x{} {} ({} bytes, {}) orient={}ms resize={}ms encode={}ms emit={}ms total={}ms",
            source_width,
            source_height,
            response.width,
            response.height,
            response.format,
            artifact.bytes().len(),
            options.return_type.as_str(),
            orient_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            emit_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(response)
    }
}
