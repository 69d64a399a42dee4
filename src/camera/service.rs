//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! `CameraService` 是宿主持有的唯一状态对象，替代全局单例：
//! 1. 生命周期清晰（由 `main.rs` 或宿主统一管理）
//! 2. 测试可创建独立实例并注入自定义采集来源 / 相册
//! 3. 请求跟踪器通过 `Arc` 注入，可与其他组件共享
//!
//! ## 实现思路
//!
//! 对外暴露少量稳定 API：
//! - `take_picture` / `choose_from_gallery`：发起一次采集并等待唯一终态响应
//! - `cleanup`：清理临时产物
//!
//! 每个请求的执行顺序：
//! ```text
//! begin ──► spawn ──► source.acquire ──┬─ Cancelled ─────────► complete(UserCancelled)
//!                                      ├─ Failed(e) ─────────► complete(e)
//!                                      └─ Bitmap ─► spawn_blocking(pipeline) ─► complete(result)
//!                                                        └─ 成功且 saveToGallery ─► 相册（不等待）
//! ```
//! 终态由后台任务投递，调用方放弃等待时请求仍会被完成并清空。
//! 采集与处理跑在内层任务中，外层任务等待其 `JoinHandle`，
//! 内层 panic 时以 `StateCorrupted` 完成请求，保证进行中状态总会被释放。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::acquisition::AcquisitionSource;
use super::gallery::{DirectoryGallerySink, GallerySink};
use super::handler::CapturePipeline;
use super::janitor::TempArtifactJanitor;
use super::source::{AcquisitionKind, AcquisitionOutcome, CleanupReport, RawBitmap};
use super::tracker::{CaptureOutcome, RequestId, RequestTracker};
use super::{CameraConfig, CameraError, CameraOptions};

/// 相机服务状态。
pub struct CameraService<S: AcquisitionSource> {
    tracker: Arc<RequestTracker>,
    pipeline: Arc<CapturePipeline>,
    source: Arc<S>,
    gallery: Option<Arc<dyn GallerySink>>,
    janitor: TempArtifactJanitor,
}

impl<S: AcquisitionSource> CameraService<S> {
    /// 使用宿主配置与采集来源创建服务。
    ///
    /// 配置了 `gallery_dir` 时自动挂载目录相册。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use slm_camera::camera::{CameraConfig, CameraService, FileLibrarySource};
    ///
    /// let config = CameraConfig::default();
    /// let source = FileLibrarySource::new(Some("photo.jpg".into()), config.max_decoded_pixels);
    /// let service = CameraService::new(config, source);
    /// ```
    pub fn new(config: CameraConfig, source: S) -> Self {
        Self::with_tracker(config, source, Arc::new(RequestTracker::new()))
    }

    /// 注入外部持有的请求跟踪器。
    pub fn with_tracker(config: CameraConfig, source: S, tracker: Arc<RequestTracker>) -> Self {
        let gallery = config
            .gallery_dir
            .clone()
            .map(|dir| Arc::new(DirectoryGallerySink::new(dir)) as Arc<dyn GallerySink>);
        let janitor = TempArtifactJanitor::new(config.temp_dir.clone(), config.file_prefix.clone());

        Self {
            tracker,
            pipeline: Arc::new(CapturePipeline::new(config)),
            source: Arc::new(source),
            gallery,
            janitor,
        }
    }

    /// 替换相册实现。
    pub fn with_gallery(mut self, gallery: impl GallerySink) -> Self {
        self.gallery = Some(Arc::new(gallery));
        self
    }

    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    pub fn pipeline(&self) -> &CapturePipeline {
        &self.pipeline
    }

    /// 拍摄一张照片。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use slm_camera::camera::{CameraConfig, CameraService, FileLibrarySource, RequestId};
    ///
    /// # async fn demo() -> Result<(), slm_camera::camera::CameraError> {
    /// let service = CameraService::new(CameraConfig::default(), FileLibrarySource::new(None, 1));
    /// let options = serde_json::json!({ "quality": 80, "targetWidth": 640 });
    /// let response = service.take_picture(RequestId::generate(), &options).await?;
    /// println!("{}x{}", response.width, response.height);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn take_picture(&self, request_id: RequestId, options: &Value) -> CaptureOutcome {
        self.acquire(AcquisitionKind::Camera, request_id, options).await
    }

    /// 从媒体库选择一张图片。
    pub async fn choose_from_gallery(&self, request_id: RequestId, options: &Value) -> CaptureOutcome {
        self.acquire(AcquisitionKind::Library, request_id, options).await
    }

    /// 发起采集并等待终态响应。
    pub async fn acquire(
        &self,
        kind: AcquisitionKind,
        request_id: RequestId,
        options: &Value,
    ) -> CaptureOutcome {
        let options = CameraOptions::from_value(options)?;
        let receiver = self.tracker.begin(request_id.clone(), options.clone())?;

        log::info!(
            "📷 开始采集 - 请求: {} 来源: {} 编码: {} 返回: {}",
            request_id,
            kind.as_str(),
            options.encoding.as_str(),
            options.return_type.as_str()
        );

        tokio::spawn(Self::drive_request(
            Arc::clone(&self.tracker),
            Arc::clone(&self.pipeline),
            Arc::clone(&self.source),
            self.gallery.clone(),
            request_id,
            kind,
            options,
        ));

        receiver.await.unwrap_or_else(|_| {
            Err(CameraError::StateCorrupted(
                "请求在投递终态前被中断".to_string(),
            ))
        })
    }

    /// 在独立任务中执行采集与处理，任务 panic 时以 `StateCorrupted` 完成请求。
    async fn drive_request(
        tracker: Arc<RequestTracker>,
        pipeline: Arc<CapturePipeline>,
        source: Arc<S>,
        gallery: Option<Arc<dyn GallerySink>>,
        request_id: RequestId,
        kind: AcquisitionKind,
        options: CameraOptions,
    ) {
        let work = tokio::spawn(Self::run_request(
            pipeline,
            source,
            gallery,
            request_id.clone(),
            kind,
            options,
        ));

        let outcome = work.await.unwrap_or_else(|join_err| {
            Err(CameraError::StateCorrupted(format!(
                "采集任务异常退出：{}",
                join_err
            )))
        });

        if let Err(err) = &outcome {
            log::warn!("❌ 请求 {} 失败 [{}:{}] {}", request_id, err.stage(), err.code(), err);
        }

        if let Err(err) = tracker.complete(&request_id, outcome) {
            log::error!("❌ 无法完成请求 {}：{}", request_id, err);
        }
    }

    async fn run_request(
        pipeline: Arc<CapturePipeline>,
        source: Arc<S>,
        gallery: Option<Arc<dyn GallerySink>>,
        request_id: RequestId,
        kind: AcquisitionKind,
        options: CameraOptions,
    ) -> CaptureOutcome {
        let acquire_start = Instant::now();
        let acquired = source.acquire(kind).await;
        log::debug!(
            "📥 采集结束 - 请求: {} 结果: {:?} 耗时: {}ms",
            request_id,
            acquired,
            acquire_start.elapsed().as_millis()
        );

        match acquired {
            AcquisitionOutcome::Cancelled => Err(CameraError::UserCancelled),
            AcquisitionOutcome::Failed(err) => Err(err),
            AcquisitionOutcome::Bitmap(bitmap) => {
                Self::transform(pipeline, gallery, bitmap, options).await
            }
        }
    }

    async fn transform(
        pipeline: Arc<CapturePipeline>,
        gallery: Option<Arc<dyn GallerySink>>,
        bitmap: RawBitmap,
        options: CameraOptions,
    ) -> CaptureOutcome {
        let gallery_job = match gallery {
            Some(sink) if options.save_to_gallery => Some((sink, bitmap.clone())),
            _ => None,
        };

        let result = tokio::task::spawn_blocking(move || pipeline.process(bitmap, &options))
            .await
            .unwrap_or_else(|e| {
                Err(CameraError::StateCorrupted(format!("图片处理任务异常退出：{}", e)))
            });

        if let (Ok(_), Some((sink, original))) = (&result, gallery_job) {
            tokio::task::spawn_blocking(move || {
                if let Err(err) = sink.save(&original) {
                    log::warn!("⚠️ 保存到相册失败（已忽略）：{}", err);
                }
            });
        }

        result
    }

    /// 清理临时产物，返回删除数量。
    pub fn cleanup(&self) -> CleanupReport {
        CleanupReport {
            cleaned: self.janitor.sweep(),
        }
    }
}
