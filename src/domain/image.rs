//! Image Request - 图片生成请求

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ValidationError;

/// 固定的生成参数
///
/// 每次只生成一张 16:9 的 JPEG，质量 80
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub num_outputs: u32,
    pub aspect_ratio: &'static str,
    pub output_format: &'static str,
    pub output_quality: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_outputs: 1,
            aspect_ratio: "16:9",
            output_format: "jpg",
            output_quality: 80,
        }
    }
}

/// 原始请求体（未校验）
#[derive(Debug, Default, Deserialize)]
pub struct ImageRequestBody {
    #[serde(default)]
    pub prompt: Option<Value>,
}

/// 已校验的图片生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub params: GenerationParams,
}

impl ImageRequest {
    pub fn validate(body: ImageRequestBody) -> Result<Self, ValidationError> {
        match body.prompt {
            Some(Value::String(prompt)) if !prompt.is_empty() => Ok(Self {
                prompt,
                params: GenerationParams::default(),
            }),
            _ => Err(ValidationError::Required("Prompt is required")),
        }
    }
}
