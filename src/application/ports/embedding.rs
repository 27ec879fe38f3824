//! Embedding Port - 文本嵌入服务抽象

use async_trait::async_trait;
use thiserror::Error;

/// 嵌入错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Embedding Port
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    /// 为每段文本生成一个向量
    ///
    /// 返回的向量数可能少于输入数，缺失的条目由调用方处理
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
