use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::camera::{CameraConfig, PerformanceProfile};
use crate::error::AppError;

/// 宿主设置文件（JSON），所有字段可选。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub temp_dir: Option<PathBuf>,
    pub file_prefix: Option<String>,
    pub gallery_dir: Option<PathBuf>,
    pub max_decoded_pixels: Option<u64>,
    pub profile: Option<String>,
}

/// 读取设置文件；文件不存在时返回 `None`。
pub fn read_settings(path: &Path) -> Result<Option<AppSettings>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件 '{}' 失败: {}", path.display(), e)))?;

    Ok(Some(parsed))
}

impl AppSettings {
    /// 叠加到默认配置上。
    pub fn apply_to(&self, config: &mut CameraConfig) -> Result<(), AppError> {
        if let Some(dir) = &self.temp_dir {
            config.temp_dir = dir.clone();
        }
        if let Some(prefix) = &self.file_prefix {
            if prefix.is_empty() {
                return Err(AppError::Settings("filePrefix 不能为空".to_string()));
            }
            config.file_prefix = prefix.clone();
        }
        if let Some(dir) = &self.gallery_dir {
            config.gallery_dir = Some(dir.clone());
        }
        if let Some(max_pixels) = self.max_decoded_pixels {
            if max_pixels == 0 {
                return Err(AppError::Settings("maxDecodedPixels 必须大于 0".to_string()));
            }
            config.max_decoded_pixels = max_pixels;
        }
        if let Some(profile) = &self.profile {
            config.apply_performance_profile(PerformanceProfile::from_str(profile)?);
        }
        Ok(())
    }
}

/// 从可选的设置文件构建配置。
pub fn load_config(path: Option<&Path>) -> Result<CameraConfig, AppError> {
    let mut config = CameraConfig::default();

    if let Some(settings) = path.map(read_settings).transpose()?.flatten() {
        settings.apply_to(&mut config)?;
        log::info!(
            "⚙️ 已加载设置：temp_dir={} prefix={} profile={}",
            config.temp_dir.display(),
            config.file_prefix,
            config.infer_performance_profile().as_str()
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::imageops::FilterType;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(Some(&dir.path().join("absent.json"))).expect("load");
        assert_eq!(config.file_prefix, CameraConfig::default().file_prefix);
    }

    #[test]
    fn settings_overlay_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "tempDir": "/var/tmp/cam", "galleryDir": "/data/DCIM", "maxDecodedPixels": 1000, "profile": "speed" }"#,
        )
        .expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.temp_dir, PathBuf::from("/var/tmp/cam"));
        assert_eq!(config.gallery_dir, Some(PathBuf::from("/data/DCIM")));
        assert_eq!(config.max_decoded_pixels, 1000);
        assert_eq!(config.resize_filter, FilterType::Nearest);
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(load_config(Some(&path)), Err(AppError::Settings(_))));
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let settings = AppSettings {
            profile: Some("turbo".to_string()),
            ..AppSettings::default()
        };
        let result = settings.apply_to(&mut CameraConfig::default());
        assert!(matches!(result, Err(AppError::Camera(_))));
    }
}
