//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 采集与产物链路中的所有失败都收敛到单一枚举 `CameraError`，
//! 它同时也是“一次请求的终态错误响应”。通过 `thiserror` 保持人类可读消息
//! （即返回给调用方的错误字符串），调用侧仍可按分支匹配。
//!
//! `code()` / `stage()` 只用于日志与诊断，不进入对外响应。

/// 采集链路统一错误类型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    /// 采集界面无法展示（无摄像头、来源不可用等）。
    #[error("采集来源不可用：{0}")]
    SourceUnavailable(String),

    /// 宿主拒绝了相机/相册权限。
    #[error("权限被拒绝：{0}")]
    PermissionDenied(String),

    /// 用户主动取消。属于终态结果，不代表流水线故障。
    #[error("用户取消了采集")]
    UserCancelled,

    /// 采集结束但没有可用位图。
    #[error("无法获取可用图像：{0}")]
    DecodeUnavailable(String),

    /// 目标尺寸超出像素上限或无法重绘。
    #[error("图像缩放失败：{0}")]
    ResizeFailed(String),

    #[error("图像编码失败：{0}")]
    EncodingFailed(String),

    #[error("临时文件写入失败：{0}")]
    FileWriteFailed(String),

    /// 调用方在上一个请求结束前再次发起请求。
    #[error("已有进行中的采集请求：{0}")]
    AlreadyPending(String),

    #[error("未知的请求标识：{0}")]
    UnknownRequest(String),

    /// 入参记录在边界解析失败。
    #[error("参数无效：{0}")]
    InvalidOptions(String),

    #[error("内部状态异常：{0}")]
    StateCorrupted(String),
}

impl CameraError {
    /// 稳定错误码，便于日志检索与告警聚合。
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "E_SOURCE_UNAVAILABLE",
            Self::PermissionDenied(_) => "E_PERMISSION_DENIED",
            Self::UserCancelled => "E_CANCELLED",
            Self::DecodeUnavailable(_) => "E_DECODE_UNAVAILABLE",
            Self::ResizeFailed(_) => "E_RESIZE_FAILED",
            Self::EncodingFailed(_) => "E_ENCODING_FAILED",
            Self::FileWriteFailed(_) => "E_FILE_WRITE_FAILED",
            Self::AlreadyPending(_) => "E_ALREADY_PENDING",
            Self::UnknownRequest(_) => "E_UNKNOWN_REQUEST",
            Self::InvalidOptions(_) => "E_INVALID_OPTIONS",
            Self::StateCorrupted(_) => "E_STATE_CORRUPTED",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidOptions(_) => "options",
            Self::SourceUnavailable(_)
            | Self::PermissionDenied(_)
            | Self::UserCancelled
            | Self::DecodeUnavailable(_) => "acquire",
            Self::ResizeFailed(_) => "resize",
            Self::EncodingFailed(_) => "encode",
            Self::FileWriteFailed(_) => "emit",
            Self::AlreadyPending(_) | Self::UnknownRequest(_) | Self::StateCorrupted(_) => "tracker",
        }
    }
}

impl From<CameraError> for String {
    /// 对外错误响应就是一条消息字符串。
    fn from(error: CameraError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_reported_as_acquire_stage() {
        let err = CameraError::UserCancelled;
        assert_eq!(err.code(), "E_CANCELLED");
        assert_eq!(err.stage(), "acquire");
    }

    #[test]
    fn resize_failures_belong_to_resize_stage() {
        let err = CameraError::ResizeFailed("too large".to_string());
        assert_eq!(err.code(), "E_RESIZE_FAILED");
        assert_eq!(err.stage(), "resize");
    }

    #[test]
    fn error_converts_into_message_string() {
        let message: String = CameraError::EncodingFailed("zero area".to_string()).into();
        assert!(message.contains("zero area"));
    }
}
