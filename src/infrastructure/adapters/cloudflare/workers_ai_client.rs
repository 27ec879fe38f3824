//! Workers AI Embedder - 调用 Workers AI 文本嵌入模型
//!
//! POST /accounts/{account_id}/ai/run/{model}
//! Request: {"text": ["..."]}
//! Response result: {"shape": [n, dims], "data": [[...], ...]}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::api::{Body, CloudflareApi};
use crate::application::ports::{EmbeddingError, EmbeddingPort};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    text: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResult {
    #[serde(default)]
    shape: Vec<usize>,
    #[serde(default)]
    data: Vec<Vec<f32>>,
}

pub struct WorkersAiEmbedder {
    api: Arc<CloudflareApi>,
    model: String,
}

impl WorkersAiEmbedder {
    pub fn new(api: Arc<CloudflareApi>, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingPort for WorkersAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let path = format!("/ai/run/{}", self.model);
        let result: EmbeddingResult = self
            .api
            .post(&path, Body::Json(&EmbeddingRequest { text: texts }))
            .await?;

        tracing::debug!(
            model = %self.model,
            inputs = texts.len(),
            shape = ?result.shape,
            "Embeddings generated"
        );

        Ok(result.data)
    }
}
