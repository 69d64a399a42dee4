//! # 产物输出模块
//!
//! ## 设计思路
//!
//! 编码后的字节有两种传输方式：
//! - `InlineBase64`：直接 Base64，不触碰文件系统
//! - `FileReference`：写入临时目录，返回 `file://` URI
//!
//! 临时文件命名为 `<prefix><毫秒时间戳>.<ext>`，清理逻辑只按前缀识别，
//! 所以这个格式不能随意改动。输出阶段从不删除自己刚写入的文件。
//!
//! ## 实现思路
//!
//! - 时间戳在进程内严格单调：`max(now, last + 1)`，同一毫秒内的两次输出
//!   得到不同文件名，格式保持不变。
//! - 以 `create_new` 打开文件，若仍与其他进程撞名则推进时间戳重试。
//! - 写入失败返回 `FileWriteFailed`，不清理可能残留的半截文件。

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use base64::{Engine as _, engine::general_purpose};

use super::source::{CaptureResponse, EncodedArtifact};
use super::{CameraError, Encoding, ReturnType};

const MAX_NAME_ATTEMPTS: usize = 16;

static LAST_STAMP_MS: AtomicU64 = AtomicU64::new(0);

/// 进程内严格递增的毫秒时间戳。
fn next_stamp_ms() -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_STAMP_MS.load(Ordering::SeqCst);
    loop {
        let next = now.max(last.saturating_add(1));
        match LAST_STAMP_MS.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// 临时产物路径：`<dir>/<prefix><stamp>.<ext>`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempArtifactRef {
    path: PathBuf,
}

impl TempArtifactRef {
    pub fn new(dir: &Path, prefix: &str, stamp_ms: u64, format: Encoding) -> Self {
        Self {
            path: dir.join(format!("{}{}.{}", prefix, stamp_ms, format.extension())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// 产物输出器。
#[derive(Debug, Clone)]
pub struct ArtifactEmitter {
    dir: PathBuf,
    prefix: String,
}

impl ArtifactEmitter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 按传输方式生成响应记录。
    pub fn emit(
        &self,
        artifact: &EncodedArtifact,
        return_type: ReturnType,
    ) -> Result<CaptureResponse, CameraError> {
        let image_data = match return_type {
            ReturnType::InlineBase64 => general_purpose::STANDARD.encode(artifact.bytes()),
            ReturnType::FileReference => self.write_temp_artifact(artifact)?.uri(),
        };

        Ok(CaptureResponse {
            image_data,
            width: artifact.width(),
            height: artifact.height(),
            format: artifact.format().as_str(),
        })
    }

    /// 写入临时文件。
    pub fn write_temp_artifact(&self, artifact: &EncodedArtifact) -> Result<TempArtifactRef, CameraError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            CameraError::FileWriteFailed(format!("无法创建临时目录 '{}'：{}", self.dir.display(), e))
        })?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let reference = TempArtifactRef::new(&self.dir, &self.prefix, next_stamp_ms(), artifact.format());

            let mut file = match OpenOptions::new().write(true).create_new(true).open(reference.path()) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("♻️ 临时文件名已存在，推进时间戳重试：{}", reference.path().display());
                    continue;
                }
                Err(e) => {
                    return Err(CameraError::FileWriteFailed(format!(
                        "无法创建临时文件 '{}'：{}",
                        reference.path().display(),
                        e
                    )));
                }
            };

            file.write_all(artifact.bytes()).map_err(|e| {
                CameraError::FileWriteFailed(format!(
                    "写入临时文件 '{}' 失败：{}",
                    reference.path().display(),
                    e
                ))
            })?;

            log::info!(
                "💾 临时产物已写入：{}（{} bytes）",
                reference.path().display(),
                artifact.bytes().len()
            );
            return Ok(reference);
        }

        Err(CameraError::FileWriteFailed(format!(
            "连续 {} 次临时文件名冲突",
            MAX_NAME_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FILE_PREFIX;
    use std::collections::HashSet;

    fn artifact(format: Encoding) -> EncodedArtifact {
        EncodedArtifact::new(vec![1, 2, 3, 4, 5], format, 7, 9)
    }

    #[test]
    fn inline_returns_base64_without_touching_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = ArtifactEmitter::new(dir.path().join("never-created"), DEFAULT_FILE_PREFIX);

        let response = emitter
            .emit(&artifact(Encoding::Jpeg), ReturnType::InlineBase64)
            .expect("inline emit");

        assert_eq!(response.image_data, "AQIDBAU=");
        assert_eq!((response.width, response.height), (7, 9));
        assert_eq!(response.format, "jpeg");
        assert!(!dir.path().join("never-created").exists());
    }

    #[test]
    fn file_reference_writes_prefixed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = ArtifactEmitter::new(dir.path(), DEFAULT_FILE_PREFIX);

        let response = emitter
            .emit(&artifact(Encoding::Png), ReturnType::FileReference)
            .expect("file emit");

        let path = response
            .image_data
            .strip_prefix("file://")
            .expect("uri should start with file://");
        let path = Path::new(path);
        let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with(DEFAULT_FILE_PREFIX));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(path).expect("read artifact"), vec![1, 2, 3, 4, 5]);
        assert_eq!(response.format, "png");
    }

    #[test]
    fn jpeg_artifacts_use_jpg_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = ArtifactEmitter::new(dir.path(), DEFAULT_FILE_PREFIX);
        let reference = emitter
            .write_temp_artifact(&artifact(Encoding::Jpeg))
            .expect("write artifact");
        assert_eq!(reference.path().extension().and_then(|e| e.to_str()), Some("jpg"));
    }

    #[test]
    fn back_to_back_emits_never_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = ArtifactEmitter::new(dir.path(), DEFAULT_FILE_PREFIX);

        let mut paths = HashSet::new();
        for _ in 0..50 {
            let reference = emitter
                .write_temp_artifact(&artifact(Encoding::Png))
                .expect("write artifact");
            assert!(paths.insert(reference.path().to_path_buf()));
        }
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 50);
    }

    #[test]
    fn stamps_are_strictly_increasing() {
        let first = next_stamp_ms();
        let second = next_stamp_ms();
        assert!(second > first);
    }

    #[test]
    fn unwritable_directory_reports_file_write_failed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").expect("write blocker");

        let emitter = ArtifactEmitter::new(blocker.join("nested"), DEFAULT_FILE_PREFIX);
        let result = emitter.emit(&artifact(Encoding::Png), ReturnType::FileReference);
        assert!(matches!(result, Err(CameraError::FileWriteFailed(_))));
    }
}
