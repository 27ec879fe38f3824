//! 账户级 REST 调用与响应信封解析

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{Credential, EmbeddingError, VectorIndexError};

#[derive(Debug, Error)]
pub enum CloudflareError {
    /// 非 2xx
    #[error("Cloudflare returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx 但 `success` 为 false
    #[error("Cloudflare API error: {0}")]
    Api(String),

    #[error("{0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<CloudflareError> for EmbeddingError {
    fn from(err: CloudflareError) -> Self {
        match err {
            CloudflareError::Http { status, body } => EmbeddingError::Provider { status, body },
            CloudflareError::Network(message) => EmbeddingError::Network(message),
            other => EmbeddingError::InvalidResponse(other.to_string()),
        }
    }
}

impl From<CloudflareError> for VectorIndexError {
    fn from(err: CloudflareError) -> Self {
        match err {
            CloudflareError::Http { status, body } => VectorIndexError::Provider { status, body },
            CloudflareError::Network(message) => VectorIndexError::Network(message),
            other => VectorIndexError::InvalidResponse(other.to_string()),
        }
    }
}

/// Cloudflare 账户配置
#[derive(Debug, Clone)]
pub struct CloudflareConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: Credential,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl CloudflareConfig {
    pub fn new(account_id: impl Into<String>, api_token: Credential) -> Self {
        Self {
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            account_id: account_id.into(),
            api_token,
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

/// 请求体
pub enum Body<'a, T: Serialize + ?Sized> {
    Json(&'a T),
    /// 每行一个 JSON 对象
    NdJson(String),
}

/// 账户级 API 客户端，由 Workers AI 与 Vectorize 共享
pub struct CloudflareApi {
    client: Client,
    config: CloudflareConfig,
}

impl CloudflareApi {
    pub fn new(config: CloudflareConfig) -> Result<Self, CloudflareError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CloudflareError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// `{base_url}/accounts/{account_id}{path}`
    pub fn account_url(&self, path: &str) -> String {
        format!(
            "{}/accounts/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_id,
            path
        )
    }

    /// POST 并解出信封中的 `result`
    pub async fn post<T, B>(&self, path: &str, body: Body<'_, B>) -> Result<T, CloudflareError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.account_url(path);
        let builder = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_token.expose());
        let builder = match body {
            Body::Json(body) => builder.json(body),
            Body::NdJson(lines) => builder
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(lines),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| CloudflareError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), body = %body, "Cloudflare request failed");
            return Err(CloudflareError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| CloudflareError::InvalidResponse(e.to_string()))?;
        unwrap_envelope(envelope)
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, CloudflareError> {
    if !envelope.success {
        let message = envelope
            .errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{} ({})", e.message, code),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CloudflareError::Api(message));
    }
    envelope
        .result
        .ok_or_else(|| CloudflareError::InvalidResponse("missing result".to_string()))
}
