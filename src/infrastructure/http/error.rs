//! HTTP Error Handling
//!
//! ApplicationError → 状态码 + JSON 错误体：
//! - Validation    → 400 `{error, details?, current_length?}`
//! - Configuration → 500 `{error}`
//! - Provider      → 透传状态码 `{error, status, details}`
//! - EmptyResult   → 500 `{error}`
//! - Unhandled     → 500 `{error, details}`
//!
//! 向量接口把 `details` 放在 `message` 字段下

use std::any::Any;

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;
use crate::domain::ValidationError;

/// 统一错误响应格式
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_length: Option<usize>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// API 错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorResponse::new(error))
    }

    pub fn internal(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(error).with_details(details),
        )
    }

    /// `details` 改用 `message` 字段
    pub fn details_as_message(mut self) -> Self {
        if let Some(details) = self.body.details.take() {
            self.body.message = Some(details);
        }
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        let mut body = ErrorResponse::new(e.to_string());
        body.details = e.details().map(str::to_string);
        body.current_length = e.current_length();
        Self::new(StatusCode::BAD_REQUEST, body)
    }
}

/// 读取请求体失败（超过大小上限等）
impl From<BytesRejection> for ApiError {
    fn from(e: BytesRejection) -> Self {
        let status = e.status();
        let error = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Request body too large"
        } else {
            "Failed to read request body"
        };
        Self::new(status, ErrorResponse::new(error).with_details(e.body_text()))
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Validation(e) => e.into(),
            ApplicationError::Configuration(message) | ApplicationError::EmptyResult(message) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(message))
            }
            ApplicationError::Provider {
                message,
                status,
                details,
            } => {
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let mut body = ErrorResponse::new(message).with_details(details);
                body.status = Some(status);
                Self::new(code, body)
            }
            ApplicationError::Unhandled { message, details } => Self::internal(message, details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = %self.body.error,
                details = ?self.body.details.as_ref().or(self.body.message.as_ref()),
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = self.status.as_u16(),
                error = %self.body.error,
                "Request rejected"
            );
        }

        (self.status, Json(self.body)).into_response()
    }
}

/// 处理函数 panic 时的兜底响应
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    ApiError::internal("Internal server error", details).into_response()
}
