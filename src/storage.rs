//! 临时产物目录管理模块
//!
//! # 设计思路
//!
//! 临时产物目录是全局共享的可变状态：输出器往里写，清理器按前缀删。
//! 这里只负责“解析出目录”与“报告目录占用”，不做加锁协调。
//!
//! # 实现思路
//!
//! - 优先使用调用方指定的目录。
//! - 未指定时回退到系统临时目录下的 `slm_camera` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::camera::TEMP_SUBDIR;
use crate::error::AppError;

/// 临时目录占用信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取临时产物目录
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的目录（已确保存在）
/// - `Err(AppError::Storage)` — 无法创建目录
pub fn resolve_temp_dir(custom_dir: Option<&Path>) -> Result<PathBuf, AppError> {
    let dir = match custom_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::temp_dir().join(TEMP_SUBDIR),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Storage(format!("创建临时目录 '{}' 失败: {}", dir.display(), e)))?;
    }

    Ok(dir)
}

/// 获取目录信息（路径 + 占用大小 + 文件数），只统计带前缀的文件
pub fn temp_dir_info(dir: &Path, prefix: &str) -> StorageInfo {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with(prefix) {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FILE_PREFIX;

    #[test]
    fn custom_dir_is_created() {
        let root = tempfile::tempdir().expect("tempdir");
        let wanted = root.path().join("nested").join("tmp");

        let dir = resolve_temp_dir(Some(&wanted)).expect("resolve");
        assert_eq!(dir, wanted);
        assert!(dir.is_dir());
    }

    #[test]
    fn default_dir_lives_under_os_temp() {
        let dir = resolve_temp_dir(None).expect("resolve");
        assert!(dir.ends_with(TEMP_SUBDIR));
    }

    #[test]
    fn info_counts_only_prefixed_files() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::write(root.path().join(format!("{}1.jpg", DEFAULT_FILE_PREFIX)), b"abc").expect("write");
        fs::write(root.path().join(format!("{}2.png", DEFAULT_FILE_PREFIX)), b"de").expect("write");
        fs::write(root.path().join("other.png"), b"zzzzzz").expect("write");

        let info = temp_dir_info(root.path(), DEFAULT_FILE_PREFIX);
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size, 5);
    }

    #[test]
    fn info_serializes_camel_case() {
        let info = StorageInfo {
            path: "/tmp/x".to_string(),
            total_size: 1,
            file_count: 2,
        };
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["totalSize"], 1);
        assert_eq!(json["fileCount"], 2);
    }
}
