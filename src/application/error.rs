//! 应用层错误定义
//!
//! 所有用例统一返回 ApplicationError，由 HTTP 层映射为响应

use thiserror::Error;

use crate::domain::ValidationError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 客户端输入错误（400）
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 服务端缺少凭据（500）
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 外部服务返回错误，状态码原样透传
    #[error("{message} (HTTP {status}): {details}")]
    Provider {
        message: String,
        status: u16,
        details: String,
    },

    /// 外部服务成功但没有可用结果（500）
    #[error("{0}")]
    EmptyResult(String),

    /// 其它未分类错误（500）
    #[error("{message}: {details}")]
    Unhandled { message: String, details: String },
}

impl ApplicationError {
    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// 创建外部服务错误
    pub fn provider(message: impl Into<String>, status: u16, details: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            status,
            details: details.into(),
        }
    }

    /// 创建空结果错误
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// 创建未分类错误
    pub fn unhandled(message: impl Into<String>, details: impl ToString) -> Self {
        Self::Unhandled {
            message: message.into(),
            details: details.to_string(),
        }
    }
}
