//! Vector Index Port - 向量索引抽象

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{CardVector, QueryFilter};

/// 向量索引错误
#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 写入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub count: usize,
    pub ids: Vec<String>,
}

/// 查询选项
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub top_k: usize,
    /// 为空时不下发过滤条件
    pub filter: Option<QueryFilter>,
    pub return_values: bool,
    pub return_metadata: bool,
}

impl QueryOptions {
    /// 返回元数据、不返回原始向量
    pub fn new(top_k: usize, filter: QueryFilter) -> Self {
        Self {
            top_k,
            filter: (!filter.is_empty()).then_some(filter),
            return_values: false,
            return_metadata: true,
        }
    }
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<Value>,
}

/// Vector Index Port
#[async_trait]
pub trait VectorIndexPort: Send + Sync {
    /// 后端名称，用于健康检查与日志
    fn backend(&self) -> &'static str;

    /// 按 id 插入或覆盖
    async fn upsert(&self, vectors: Vec<CardVector>) -> Result<UpsertResult, VectorIndexError>;

    /// 相似度查询，结果按得分降序
    async fn query(
        &self,
        vector: Vec<f32>,
        options: QueryOptions,
    ) -> Result<Vec<VectorMatch>, VectorIndexError>;
}
