//! Replicate Client - 运行 Replicate 模型并等待结果
//!
//! 实现 ImageGeneratorPort
//!
//! Replicate API:
//! POST {base_url}/models/{owner}/{name}/predictions   (无版本)
//! POST {base_url}/predictions                         (带版本)
//! GET  {base_url}/predictions/{id}
//! POST {base_url}/predictions/{id}/cancel
//!
//! 创建时带 `Prefer: wait` 让服务端阻塞等待，未结束再轮询

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::model_ref::ModelRef;
use super::prediction::{CreatePrediction, Prediction, PredictionInput, PredictionStatus};
use crate::application::ports::{Credential, ImageError, ImageGeneratorPort};
use crate::domain::ImageRequest;
use crate::infrastructure::adapters::retry::{with_retries, RetryPolicy};

/// Replicate 客户端配置
#[derive(Debug, Clone)]
pub struct ReplicateClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// 要运行的模型
    pub model: ModelRef,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 轮询间隔
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for ReplicateClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.replicate.com/v1".to_string(),
            model: ModelRef {
                owner: "black-forest-labs".to_string(),
                name: "flux-schnell".to_string(),
                version: None,
            },
            timeout_secs: 120,
            poll_interval: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }
}

impl ReplicateClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: ModelRef) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Replicate 客户端
pub struct ReplicateClient {
    client: Client,
    config: ReplicateClientConfig,
}

impl ReplicateClient {
    pub fn new(config: ReplicateClientConfig) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("glesolas-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ImageError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), route)
    }

    /// 发送请求，按策略重试；非 2xx 转为 Provider 错误
    ///
    /// 只有 GET 被视为幂等
    async fn send<B: Serialize + ?Sized>(
        &self,
        credential: &Credential,
        method: Method,
        route: &str,
        body: Option<&B>,
        prefer_wait: bool,
    ) -> Result<Response, ImageError> {
        let url = self.url(route);
        let idempotent = method == Method::GET;

        let result = with_retries(&self.config.retry, idempotent, || {
            let mut builder = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(credential.expose());
            if prefer_wait {
                builder = builder.header("Prefer", "wait");
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }
            builder.send()
        })
        .await;

        let response = result.map_err(|e| ImageError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "Replicate request failed"
            );
            return Err(ImageError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn read_prediction(response: Response) -> Result<Prediction, ImageError> {
        response
            .json::<Prediction>()
            .await
            .map_err(|e| ImageError::InvalidResponse(e.to_string()))
    }

    async fn create_prediction(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> Result<Prediction, ImageError> {
        let model = &self.config.model;
        let route = match model.version {
            Some(_) => "/predictions".to_string(),
            None => format!("/models/{}/{}/predictions", model.owner, model.name),
        };
        let body = CreatePrediction {
            version: model.version.as_deref(),
            input: PredictionInput {
                prompt: &request.prompt,
                params: &request.params,
            },
        };

        let response = self
            .send(credential, Method::POST, &route, Some(&body), true)
            .await?;
        Self::read_prediction(response).await
    }

    async fn get_prediction(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Prediction, ImageError> {
        let route = format!("/predictions/{}", id);
        let response = self
            .send::<Value>(credential, Method::GET, &route, None, false)
            .await?;
        Self::read_prediction(response).await
    }

    async fn cancel_prediction(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Prediction, ImageError> {
        let route = format!("/predictions/{}/cancel", id);
        let response = self
            .send::<Value>(credential, Method::POST, &route, None, false)
            .await?;
        Self::read_prediction(response).await
    }
}

#[async_trait]
impl ImageGeneratorPort for ReplicateClient {
    async fn generate(
        &self,
        credential: &Credential,
        request: &ImageRequest,
        cancel: CancellationToken,
    ) -> Result<Value, ImageError> {
        tracing::debug!(model = %self.config.model, "Creating prediction");
        let mut prediction = self.create_prediction(credential, request).await?;
        tracing::debug!(
            prediction_id = %prediction.id,
            status = ?prediction.status,
            "Prediction created"
        );

        while !prediction.status.is_terminal() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(prediction_id = %prediction.id, "Canceling prediction");
                    if let Err(e) = self.cancel_prediction(credential, &prediction.id).await {
                        tracing::warn!(
                            prediction_id = %prediction.id,
                            error = %e,
                            "Failed to cancel prediction"
                        );
                    }
                    return Err(ImageError::Canceled);
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
            prediction = self.get_prediction(credential, &prediction.id).await?;
            tracing::debug!(
                prediction_id = %prediction.id,
                status = ?prediction.status,
                "Polled prediction"
            );
        }

        match prediction.status {
            PredictionStatus::Succeeded => {
                tracing::info!(prediction_id = %prediction.id, "Prediction succeeded");
                Ok(prediction.output.unwrap_or(Value::Null))
            }
            PredictionStatus::Canceled => Err(ImageError::Canceled),
            _ => Err(ImageError::PredictionFailed(prediction.error_message())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ReplicateClientConfig::default();
        assert_eq!(config.base_url, "https://api.replicate.com/v1");
        assert_eq!(config.model.to_string(), "black-forest-labs/flux-schnell");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_config_builder() {
        let config = ReplicateClientConfig::new("http://127.0.0.1:9000/")
            .with_model("owner/model:v1".parse().unwrap())
            .with_poll_interval(Duration::from_millis(5))
            .with_retry(RetryPolicy::none())
            .with_timeout(3);
        assert_eq!(config.model.version.as_deref(), Some("v1"));
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.timeout_secs, 3);

        let client = ReplicateClient::new(config).unwrap();
        assert_eq!(client.url("/predictions"), "http://127.0.0.1:9000/predictions");
    }
}
