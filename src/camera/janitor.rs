//! 临时产物清理。
//!
//! 尽力而为：目录读取失败返回 0，单个文件删除失败只记日志并继续。

use std::fs;
use std::path::{Path, PathBuf};

/// 按文件名前缀清理临时目录。
#[derive(Debug, Clone)]
pub struct TempArtifactJanitor {
    dir: PathBuf,
    prefix: String,
}

impl TempArtifactJanitor {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 删除所有以前缀开头的条目，返回成功删除的数量。
    pub fn sweep(&self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("🧹 临时目录不可读，跳过清理 '{}'：{}", self.dir.display(), e);
                return 0;
            }
        };

        let mut cleaned = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&self.prefix) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => cleaned += 1,
                Err(e) => {
                    log::warn!("⚠️ 删除临时文件失败 '{}'：{}", entry.path().display(), e);
                }
            }
        }

        log::info!("🧹 临时产物清理完成：{} 个（目录 {}）", cleaned, self.dir.display());
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FILE_PREFIX;

    #[test]
    fn removes_only_prefixed_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..4 {
            fs::write(dir.path().join(format!("{}{}.jpg", DEFAULT_FILE_PREFIX, i)), b"x").expect("write");
        }
        for name in ["keep.jpg", "other_slm_camera_1.png", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").expect("write");
        }

        let janitor = TempArtifactJanitor::new(dir.path(), DEFAULT_FILE_PREFIX);
        assert_eq!(janitor.sweep(), 4);

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(remaining.len(), 3);
        assert!(remaining.iter().all(|name| !name.starts_with(DEFAULT_FILE_PREFIX)));
    }

    #[test]
    fn missing_directory_counts_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let janitor = TempArtifactJanitor::new(dir.path().join("absent"), DEFAULT_FILE_PREFIX);
        assert_eq!(janitor.sweep(), 0);
    }

    #[test]
    fn undeletable_entry_does_not_abort_sweep() {
        let dir = tempfile::tempdir().expect("tempdir");
        // 目录无法用 remove_file 删除
        fs::create_dir(dir.path().join(format!("{}dir", DEFAULT_FILE_PREFIX))).expect("mkdir");
        fs::write(dir.path().join(format!("{}1.png", DEFAULT_FILE_PREFIX)), b"x").expect("write");
        fs::write(dir.path().join(format!("{}2.png", DEFAULT_FILE_PREFIX)), b"x").expect("write");

        let janitor = TempArtifactJanitor::new(dir.path(), DEFAULT_FILE_PREFIX);
        assert_eq!(janitor.sweep(), 2);
    }

    #[test]
    fn second_sweep_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(format!("{}1.png", DEFAULT_FILE_PREFIX)), b"x").expect("write");

        let janitor = TempArtifactJanitor::new(dir.path(), DEFAULT_FILE_PREFIX);
        assert_eq!(janitor.sweep(), 1);
        assert_eq!(janitor.sweep(), 0);
    }
}
