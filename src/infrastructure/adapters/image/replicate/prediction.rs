//! Prediction - Replicate 预测任务
//!
//! 状态流转：starting → processing → succeeded | failed | canceled

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::GenerationParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    /// 是否已结束
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Prediction {
    /// 失败原因（字符串原样返回，其它 JSON 序列化后返回）
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// 模型输入
#[derive(Debug, Serialize)]
pub struct PredictionInput<'a> {
    pub prompt: &'a str,
    #[serde(flatten)]
    pub params: &'a GenerationParams,
}

/// 创建请求体
///
/// 走版本端点时带 `version`，走模型端点时省略
#[derive(Debug, Serialize)]
pub struct CreatePrediction<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    pub input: PredictionInput<'a>,
}
