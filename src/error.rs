//! 统一错误类型模块
//!
//! # 设计思路
//!
//! `camera` 模块内部只使用 `CameraError`；宿主层（设置、存储、CLI）
//! 的失败统一收敛到 `AppError`，避免到处 `.map_err(|e| e.to_string())`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CameraError` 与 `std::io::Error` 提供 `From` 转换，`?` 即可传播。
//! - 实现 `Serialize` 将错误序列化为字符串，与错误响应的“单条消息”形态一致。

use serde::Serialize;

use crate::camera::CameraError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 采集或后处理流水线错误
    #[error("{0}")]
    Camera(#[from] CameraError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 临时目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 设置文件无法解析
    #[error("设置无效: {0}")]
    Settings(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_errors_keep_their_message() {
        let err: AppError = CameraError::UserCancelled.into();
        assert_eq!(err.to_string(), CameraError::UserCancelled.to_string());
    }

    #[test]
    fn serializes_as_plain_string() {
        let err = AppError::Storage("only a test".to_string());
        let json = serde_json::to_string(&err).expect("serialize");
        assert_eq!(json, "\"存储目录不可用: only a test\"");
    }
}
