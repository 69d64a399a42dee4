//! # 请求跟踪模块
//!
//! ## 设计思路
//!
//! 任意时刻至多存在一个进行中的请求。`RequestTracker` 是显式注入的状态持有者，
//! 只暴露 `begin` / `complete` 两个修改入口，替代“共享字段被随手覆盖”的做法。
//!
//! ## 实现思路
//!
//! - 进行中请求保存在 `Mutex<Option<PendingRequest>>` 中。
//! - `begin` 返回一个 `oneshot::Receiver`，调用方在上面等待终态响应。
//! - `complete` 取走请求并消费 `oneshot::Sender`，因此同一请求不可能被响应两次；
//!   重复 `complete` 会得到 `UnknownRequest`。
//! - 第二个请求在第一个结束前到达时直接拒绝（`AlreadyPending`），不排队。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use super::source::CaptureResponse;
use super::{CameraError, CameraOptions};

/// 一次请求的终态：成功响应或错误。
pub type CaptureOutcome = Result<CaptureResponse, CameraError>;

static GENERATED_IDS: AtomicU64 = AtomicU64::new(0);

/// 用于关联终态响应的不透明请求标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 生成进程内唯一的标识（宿主未提供时使用）。
    pub fn generate() -> Self {
        let seq = GENERATED_IDS.fetch_add(1, Ordering::SeqCst);
        Self(format!("req-{}-{}", chrono::Utc::now().timestamp_millis(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

struct PendingRequest {
    id: RequestId,
    options: CameraOptions,
    responder: oneshot::Sender<CaptureOutcome>,
}

/// 单请求跟踪器。
#[derive(Default)]
pub struct RequestTracker {
    pending: Mutex<Option<PendingRequest>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<PendingRequest>>, CameraError> {
        self.pending
            .lock()
            .map_err(|_| CameraError::StateCorrupted("请求跟踪锁已中毒".to_string()))
    }

    /// 登记新请求；已有进行中请求时返回 `AlreadyPending`。
    pub fn begin(
        &self,
        id: RequestId,
        options: CameraOptions,
    ) -> Result<oneshot::Receiver<CaptureOutcome>, CameraError> {
        let mut guard = self.lock()?;

        if let Some(existing) = guard.as_ref() {
            log::warn!("🚫 拒绝请求 {}：请求 {} 仍在进行中", id, existing.id);
            return Err(CameraError::AlreadyPending(existing.id.to_string()));
        }

        let (responder, receiver) = oneshot::channel();
        log::debug!("📝 登记请求 {}", id);
        *guard = Some(PendingRequest {
            id,
            options,
            responder,
        });

        Ok(receiver)
    }

    /// 完成请求：清空进行中状态并投递终态响应（恰好一次）。
    pub fn complete(&self, id: &RequestId, outcome: CaptureOutcome) -> Result<(), CameraError> {
        let pending = {
            let mut guard = self.lock()?;
            let matches = guard.as_ref().is_some_and(|pending| pending.id == *id);
            if matches { guard.take() } else { None }
        };

        let Some(pending) = pending else {
            return Err(CameraError::UnknownRequest(id.to_string()));
        };

        match &outcome {
            Ok(_) => log::debug!("📬 请求 {} 成功完成", id),
            Err(err) => log::debug!("📬 请求 {} 以错误结束：[{}] {}", id, err.code(), err),
        }

        if pending.responder.send(outcome).is_err() {
            log::warn!("⚠️ 请求 {} 的接收方已放弃等待，响应被丢弃", id);
        }

        Ok(())
    }

    /// 当前进行中请求的标识。
    pub fn pending_id(&self) -> Result<Option<RequestId>, CameraError> {
        Ok(self.lock()?.as_ref().map(|pending| pending.id.clone()))
    }

    /// 读取进行中请求的参数副本。
    pub fn pending_options(&self, id: &RequestId) -> Result<CameraOptions, CameraError> {
        self.lock()?
            .as_ref()
            .filter(|pending| pending.id == *id)
            .map(|pending| pending.options.clone())
            .ok_or_else(|| CameraError::UnknownRequest(id.to_string()))
    }

    pub fn is_pending(&self) -> Result<bool, CameraError> {
        Ok(self.lock()?.is_some())
    }
}
