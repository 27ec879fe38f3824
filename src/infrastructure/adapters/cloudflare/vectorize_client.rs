//! Vectorize Client - Vectorize v2 索引
//!
//! POST /accounts/{account_id}/vectorize/v2/indexes/{index}/upsert  (NDJSON)
//! POST /accounts/{account_id}/vectorize/v2/indexes/{index}/query   (JSON)
//!
//! v2 的 upsert 是异步变更，只返回 mutationId，写入条数与 id 由提交的向量得出

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::api::{Body, CloudflareApi, CloudflareError};
use crate::application::ports::{
    QueryOptions, UpsertResult, VectorIndexError, VectorIndexPort, VectorMatch,
};
use crate::domain::{CardVector, QueryFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationResult {
    #[serde(default)]
    mutation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    return_values: bool,
    return_metadata: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a QueryFilter>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

pub struct VectorizeClient {
    api: Arc<CloudflareApi>,
    index_name: String,
}

impl VectorizeClient {
    pub fn new(api: Arc<CloudflareApi>, index_name: impl Into<String>) -> Self {
        Self {
            api,
            index_name: index_name.into(),
        }
    }

    fn index_path(&self, action: &str) -> String {
        format!("/vectorize/v2/indexes/{}/{}", self.index_name, action)
    }
}

/// 每个向量一行
fn to_ndjson(vectors: &[CardVector]) -> Result<String, CloudflareError> {
    let mut lines = String::new();
    for vector in vectors {
        let line = serde_json::to_string(vector)
            .map_err(|e| CloudflareError::InvalidResponse(e.to_string()))?;
        lines.push_str(&line);
        lines.push('\n');
    }
    Ok(lines)
}

#[async_trait]
impl VectorIndexPort for VectorizeClient {
    fn backend(&self) -> &'static str {
        "vectorize"
    }

    async fn upsert(&self, vectors: Vec<CardVector>) -> Result<UpsertResult, VectorIndexError> {
        let ids: Vec<String> = vectors.iter().map(|v| v.id.clone()).collect();
        if vectors.is_empty() {
            return Ok(UpsertResult { count: 0, ids });
        }

        let body = to_ndjson(&vectors)?;
        let result: MutationResult = self
            .api
            .post(&self.index_path("upsert"), Body::<()>::NdJson(body))
            .await?;

        tracing::info!(
            index = %self.index_name,
            count = ids.len(),
            mutation_id = ?result.mutation_id,
            "Vectors upserted"
        );

        Ok(UpsertResult {
            count: ids.len(),
            ids,
        })
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        options: QueryOptions,
    ) -> Result<Vec<VectorMatch>, VectorIndexError> {
        let request = QueryRequest {
            vector: &vector,
            top_k: options.top_k,
            return_values: options.return_values,
            return_metadata: if options.return_metadata { "all" } else { "none" },
            filter: options.filter.as_ref(),
        };

        let result: QueryResult = self
            .api
            .post(&self.index_path("query"), Body::Json(&request))
            .await?;

        tracing::debug!(
            index = %self.index_name,
            matches = result.matches.len(),
            "Vector query completed"
        );

        Ok(result
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}
