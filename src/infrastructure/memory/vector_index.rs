//! In-Memory Vector Index Implementation
//!
//! 按 id 覆盖写入；查询时线性扫描，余弦相似度降序

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::application::ports::{
    QueryOptions, UpsertResult, VectorIndexError, VectorIndexPort, VectorMatch,
};
use crate::domain::CardVector;

#[derive(Debug, Clone)]
struct StoredVector {
    values: Vec<f32>,
    metadata: Value,
}

/// 内存向量索引
pub struct InMemoryVectorIndex {
    vectors: DashMap<String, StoredVector>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            vectors: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// 维度不一致或含零向量时为 0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndexPort for InMemoryVectorIndex {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, vectors: Vec<CardVector>) -> Result<UpsertResult, VectorIndexError> {
        let mut ids = Vec::with_capacity(vectors.len());
        for vector in vectors {
            let metadata = serde_json::to_value(&vector.metadata)
                .map_err(|e| VectorIndexError::InvalidResponse(e.to_string()))?;
            self.vectors.insert(
                vector.id.clone(),
                StoredVector {
                    values: vector.values,
                    metadata,
                },
            );
            ids.push(vector.id);
        }

        tracing::debug!(count = ids.len(), total = self.vectors.len(), "Vectors upserted");
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
        let mut matches: Vec<VectorMatch> = self
            .vectors
            .iter()
            .filter(|entry| {
                options
                    .filter
                    .as_ref()
                    .map_or(true, |filter| filter.matches(&entry.metadata))
            })
            .map(|entry| VectorMatch {
                id: entry.key().clone(),
                score: cosine_similarity(&vector, &entry.values),
                metadata: options.return_metadata.then(|| entry.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(options.top_k);

        Ok(matches)
    }
}
