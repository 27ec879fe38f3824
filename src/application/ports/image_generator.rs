//! Image Generator Port - 图片生成服务抽象

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::secret_store::Credential;
use crate::domain::ImageRequest;

/// 图片生成错误
#[derive(Debug, Error)]
pub enum ImageError {
    /// 服务端返回非 2xx
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// 任务以 failed 结束
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// 任务被取消
    #[error("Prediction canceled")]
    Canceled,

    #[error("{0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Image Generator Port
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    /// 运行生成任务并等待完成
    ///
    /// 返回模型的原始输出；`cancel` 触发时实现方需主动取消仍在运行的任务
    async fn generate(
        &self,
        credential: &Credential,
        request: &ImageRequest,
        cancel: CancellationToken,
    ) -> Result<Value, ImageError>;
}
