//! Domain Errors - 输入校验错误

use thiserror::Error;

/// 输入校验错误
///
/// 客户端输入不合法时产生，HTTP 层统一映射为 400
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// 必填字段缺失或类型不符
    #[error("{0}")]
    Required(&'static str),

    /// 文本长度超出上限
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong {
        field: &'static str,
        max: usize,
        current_length: usize,
    },

    /// 字段值无法解析
    #[error("{message}")]
    Invalid {
        message: String,
        details: Option<String>,
    },
}

impl ValidationError {
    /// 创建字段值非法错误
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
            details: None,
        }
    }

    /// 创建带诊断信息的非法错误
    pub fn invalid_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// 超长时回报的当前长度
    pub fn current_length(&self) -> Option<usize> {
        match self {
            Self::TooLong { current_length, .. } => Some(*current_length),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Invalid { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}
