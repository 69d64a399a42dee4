//! # 配置模块
//!
//! ## 设计思路
//!
//! 这里有两类配置，生命周期不同：
//! - `CameraOptions`：每次请求由调用方传入的弱类型记录，只在边界解析一次，
//!   之后各阶段只读强类型字段，不再各自去“猜”原始 JSON。
//! - `CameraConfig`：宿主级别的可调策略（临时目录、文件前缀、缩放滤镜等），
//!   由 `settings` 或测试注入。
//!
//! ## 实现思路
//!
//! - 缺失或 `null` 字段一律取默认值。
//! - 数值字段钳制到合法区间（quality → 0..=100，负的目标尺寸视为未指定）。
//! - 枚举字段同时接受字符串与序号（`encoding: "png"` 与 `encoding: 1` 等价）。
//! - 类型错误或未知枚举值返回 `CameraError::InvalidOptions`。
//! - `PerformanceProfile` 把“档位”语义映射到底层缩放滤镜。

use std::path::PathBuf;

use image::imageops::FilterType;
use serde_json::{Map, Value};

use super::CameraError;

/// 临时产物文件名的固定前缀，清理逻辑依赖它识别文件。
pub const DEFAULT_FILE_PREFIX: &str = "slm_camera_";
/// 系统临时目录下的专用子目录名。
pub const TEMP_SUBDIR: &str = "slm_camera";
pub const DEFAULT_QUALITY: u8 = 85;

/// 输出编码格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Jpeg,
    Png,
}

impl Encoding {
    /// 解析 `"jpeg" | "jpg" | "png"` 或序号 `0 | 1`。
    pub(crate) fn from_value(value: &Value) -> Result<Self, CameraError> {
        match value {
            Value::String(text) => match text.trim().to_lowercase().as_str() {
                "jpeg" | "jpg" => Ok(Self::Jpeg),
                "png" => Ok(Self::Png),
                other => Err(CameraError::InvalidOptions(format!(
                    "未知编码格式：{}（可选：jpeg / png）",
                    other
                ))),
            },
            Value::Number(number) => match number.as_i64() {
                Some(0) => Ok(Self::Jpeg),
                Some(1) => Ok(Self::Png),
                _ => Err(CameraError::InvalidOptions(format!(
                    "未知编码序号：{}（可选：0 / 1）",
                    number
                ))),
            },
            other => Err(CameraError::InvalidOptions(format!(
                "encoding 类型错误：{}",
                other
            ))),
        }
    }

    /// 响应中的 `format` 字段。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// 临时文件扩展名。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// 结果传输方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnType {
    /// 直接返回 Base64 编码后的字节。
    #[default]
    InlineBase64,
    /// 写入临时文件并返回 `file://` URI。
    FileReference,
}

impl ReturnType {
    pub(crate) fn from_value(value: &Value) -> Result<Self, CameraError> {
        let Value::String(text) = value else {
            return Err(CameraError::InvalidOptions(format!(
                "returnType 类型错误：{}",
                value
            )));
        };

        match text.trim().to_lowercase().as_str() {
            "base64" => Ok(Self::InlineBase64),
            "fileuri" => Ok(Self::FileReference),
            other => Err(CameraError::InvalidOptions(format!(
                "未知返回类型：{}（可选：base64 / fileURI）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineBase64 => "base64",
            Self::FileReference => "fileURI",
        }
    }
}

/// 单次请求的强类型参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraOptions {
    /// JPEG 质量（0..=100），PNG 忽略。
    pub quality: u8,
    /// 目标宽度，0 表示未指定。
    pub target_width: u32,
    /// 目标高度，0 表示未指定。
    pub target_height: u32,
    pub encoding: Encoding,
    pub correct_orientation: bool,
    pub save_to_gallery: bool,
    pub return_type: ReturnType,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            target_width: 0,
            target_height: 0,
            encoding: Encoding::Jpeg,
            correct_orientation: true,
            save_to_gallery: false,
            return_type: ReturnType::InlineBase64,
        }
    }
}

impl CameraOptions {
    /// 从调用方传入的 JSON 记录解析参数。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use slm_camera::camera::{CameraOptions, Encoding};
    ///
    /// let options = CameraOptions::from_value(&serde_json::json!({
    ///     "quality": 120,
    ///     "encoding": 1,
    /// }))?;
    /// assert_eq!(options.quality, 100);
    /// assert_eq!(options.encoding, Encoding::Png);
    /// # Ok::<(), slm_camera::camera::CameraError>(())
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, CameraError> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(CameraError::InvalidOptions(format!(
                    "参数必须是对象：{}",
                    other
                )));
            }
        };

        let mut options = Self::default();

        if let Some(quality) = read_int(map, "quality")? {
            options.quality = quality.clamp(0, 100) as u8;
        }
        if let Some(width) = read_int(map, "targetWidth")? {
            options.target_width = clamp_dimension(width);
        }
        if let Some(height) = read_int(map, "targetHeight")? {
            options.target_height = clamp_dimension(height);
        }
        if let Some(encoding) = field(map, "encoding").or_else(|| field(map, "encodingType")) {
            options.encoding = Encoding::from_value(encoding)?;
        }
        if let Some(correct) = read_bool(map, "correctOrientation")? {
            options.correct_orientation = correct;
        }
        if let Some(save) = read_bool(map, "saveToGallery")? {
            options.save_to_gallery = save;
        }
        if let Some(return_type) = field(map, "returnType") {
            options.return_type = ReturnType::from_value(return_type)?;
        }

        Ok(options)
    }

    /// 是否需要缩放阶段。
    pub fn wants_resize(&self) -> bool {
        self.target_width > 0 || self.target_height > 0
    }
}

fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn read_int(map: &Map<String, Value>, key: &str) -> Result<Option<i64>, CameraError> {
    let Some(value) = field(map, key) else {
        return Ok(None);
    };

    let number = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        .ok_or_else(|| CameraError::InvalidOptions(format!("{} 必须是整数：{}", key, value)))?;

    Ok(Some(number))
}

fn read_bool(map: &Map<String, Value>, key: &str) -> Result<Option<bool>, CameraError> {
    let Some(value) = field(map, key) else {
        return Ok(None);
    };

    value
        .as_bool()
        .map(Some)
        .ok_or_else(|| CameraError::InvalidOptions(format!("{} 必须是布尔值：{}", key, value)))
}

/// 负值视为未指定，超出 `u32` 的值截到上限。
fn clamp_dimension(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// 宿主级配置。
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// 临时产物目录。
    pub temp_dir: PathBuf,
    /// 临时产物文件名前缀。
    pub file_prefix: String,
    /// 相册目录；为空时跳过“保存到相册”。
    pub gallery_dir: Option<PathBuf>,
    /// 文件来源解码前允许的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    pub resize_filter: FilterType,
    /// 是否优先使用 `fast_image_resize`，失败时回退 `image::resize_exact`。
    pub fast_resize: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join(TEMP_SUBDIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            gallery_dir: None,
            max_decoded_pixels: 40_000_000,
            resize_filter: FilterType::Triangle,
            fast_resize: true,
        }
    }
}

/// 缩放性能档位。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl PerformanceProfile {
    pub fn from_str(profile: &str) -> Result<Self, CameraError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(CameraError::InvalidOptions(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CameraConfig {
    pub fn apply_performance_profile(&mut self, profile: PerformanceProfile) {
        match profile {
            PerformanceProfile::Quality => {
                self.resize_filter = FilterType::CatmullRom;
            }
            PerformanceProfile::Balanced => {
                self.resize_filter = FilterType::Triangle;
            }
            PerformanceProfile::Speed => {
                self.resize_filter = FilterType::Nearest;
            }
        }
    }

    /// 基于当前滤镜反推档位。
    pub fn infer_performance_profile(&self) -> PerformanceProfile {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Gaussian | FilterType::Lanczos3 => {
                PerformanceProfile::Quality
            }
            FilterType::Nearest => PerformanceProfile::Speed,
            FilterType::Triangle => PerformanceProfile::Balanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn empty_record_yields_documented_defaults() {
        let options = CameraOptions::from_value(&json!({})).expect("empty object should parse");
        assert_eq!(options, CameraOptions::default());
        assert_eq!(options.quality, 85);
        assert!(options.correct_orientation);
        assert!(!options.save_to_gallery);
        assert_eq!(options.return_type, ReturnType::InlineBase64);

        let from_null = CameraOptions::from_value(&Value::Null).expect("null should parse");
        assert_eq!(from_null, CameraOptions::default());
    }

    #[test]
    fn parses_full_record() {
        let options = CameraOptions::from_value(&json!({
            "quality": 60,
            "targetWidth": 200,
            "targetHeight": 0,
            "encoding": "png",
            "correctOrientation": false,
            "saveToGallery": true,
            "returnType": "fileURI",
        }))
        .expect("full record should parse");

        assert_eq!(options.quality, 60);
        assert_eq!(options.target_width, 200);
        assert_eq!(options.target_height, 0);
        assert_eq!(options.encoding, Encoding::Png);
        assert!(!options.correct_orientation);
        assert!(options.save_to_gallery);
        assert_eq!(options.return_type, ReturnType::FileReference);
    }

    #[test]
    fn encoding_accepts_ordinal_and_legacy_key() {
        let ordinal = CameraOptions::from_value(&json!({ "encoding": 1 })).expect("ordinal");
        assert_eq!(ordinal.encoding, Encoding::Png);

        let legacy = CameraOptions::from_value(&json!({ "encodingType": 0 })).expect("legacy key");
        assert_eq!(legacy.encoding, Encoding::Jpeg);
    }

    #[test]
    fn negative_targets_are_unspecified() {
        let options = CameraOptions::from_value(&json!({ "targetWidth": -5, "targetHeight": -1 }))
            .expect("negative targets should parse");
        assert_eq!(options.target_width, 0);
        assert_eq!(options.target_height, 0);
        assert!(!options.wants_resize());
    }

    #[test]
    fn rejects_unknown_enum_values_and_wrong_types() {
        assert!(matches!(
            CameraOptions::from_value(&json!({ "encoding": "gif" })),
            Err(CameraError::InvalidOptions(_))
        ));
        assert!(matches!(
            CameraOptions::from_value(&json!({ "encoding": 2 })),
            Err(CameraError::InvalidOptions(_))
        ));
        assert!(matches!(
            CameraOptions::from_value(&json!({ "returnType": "dataURL" })),
            Err(CameraError::InvalidOptions(_))
        ));
        assert!(matches!(
            CameraOptions::from_value(&json!({ "quality": "high" })),
            Err(CameraError::InvalidOptions(_))
        ));
        assert!(matches!(
            CameraOptions::from_value(&json!({ "saveToGallery": "yes" })),
            Err(CameraError::InvalidOptions(_))
        ));
        assert!(matches!(
            CameraOptions::from_value(&json!([1, 2])),
            Err(CameraError::InvalidOptions(_))
        ));
    }

    #[test]
    fn profile_roundtrip_through_config() {
        let mut config = CameraConfig::default();
        for name in ["quality", "balanced", "speed"] {
            let profile = PerformanceProfile::from_str(name).expect("known profile");
            config.apply_performance_profile(profile);
            assert_eq!(config.infer_performance_profile().as_str(), name);
        }
        assert!(PerformanceProfile::from_str("ultra").is_err());
    }

    proptest! {
        #[test]
        fn prop_quality_is_always_clamped(quality in any::<i32>()) {
            let options = CameraOptions::from_value(&json!({ "quality": quality }))
                .expect("integer quality should parse");
            prop_assert!(options.quality <= 100);
            if (0..=100).contains(&quality) {
                prop_assert_eq!(options.quality as i32, quality);
            }
        }

        #[test]
        fn prop_target_dimensions_never_negative(width in any::<i64>(), height in any::<i64>()) {
            let options = CameraOptions::from_value(&json!({ "targetWidth": width, "targetHeight": height }))
                .expect("integer targets should parse");
            prop_assert_eq!(options.target_width == 0, width <= 0);
            prop_assert_eq!(options.target_height == 0, height <= 0);
        }
    }
}
