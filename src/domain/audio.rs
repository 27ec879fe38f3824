//! Audio Request - 语音合成请求
//!
//! 校验规则：
//! - `text` 必填且为字符串
//! - `text` 不超过 2500 个字符（超长时回报当前长度）
//! - `voice_id` / `model_id` / `voice_settings` 可选，缺省使用固定默认值

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ValidationError;

/// 单次请求允许的最大字符数
pub const MAX_TEXT_CHARS: usize = 2500;

/// 默认音色（George）
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";

/// 默认模型（flash，最快最便宜）
pub const DEFAULT_MODEL_ID: &str = "eleven_flash_v2_5";

/// 音色参数
///
/// 每个字段都可单独缺省，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// 原始请求体（未校验）
#[derive(Debug, Default, Deserialize)]
pub struct AudioRequestBody {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub voice_settings: Option<VoiceSettings>,
}

/// 已校验的语音合成请求
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

impl AudioRequest {
    /// 校验原始请求体
    pub fn validate(body: AudioRequestBody) -> Result<Self, ValidationError> {
        let text = match body.text {
            Some(Value::String(text)) if !text.is_empty() => text,
            _ => return Err(ValidationError::Required("Text is required")),
        };

        let current_length = text.chars().count();
        if current_length > MAX_TEXT_CHARS {
            return Err(ValidationError::TooLong {
                field: "Text",
                max: MAX_TEXT_CHARS,
                current_length,
            });
        }

        Ok(Self {
            text,
            voice_id: non_empty_or(body.voice_id, DEFAULT_VOICE_ID),
            model_id: non_empty_or(body.model_id, DEFAULT_MODEL_ID),
            voice_settings: body.voice_settings.unwrap_or_default(),
        })
    }

    /// 字符数
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
