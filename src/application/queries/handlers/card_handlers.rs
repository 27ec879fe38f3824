//! Card Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pipeline;
use crate::application::ports::{EmbeddingPort, QueryOptions, VectorIndexPort, VectorMatch};
use crate::application::queries::card_queries::*;
use crate::domain::CardQuery;

const QUERY_FAILED: &str = "Failed to query vectors";

/// QueryCards Handler - 文本 → 向量 → 相似查询
pub struct QueryCardsHandler {
    embedder: Arc<dyn EmbeddingPort>,
    index: Arc<dyn VectorIndexPort>,
    max_top_k: usize,
}

impl QueryCardsHandler {
    pub fn new(
        embedder: Arc<dyn EmbeddingPort>,
        index: Arc<dyn VectorIndexPort>,
        max_top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            max_top_k,
        }
    }

    pub async fn handle(&self, query: QueryCards) -> Result<QueryCardsResponse, ApplicationError> {
        let max_top_k = self.max_top_k;

        pipeline::run(
            query.params,
            |params| CardQuery::validate(params, max_top_k),
            pipeline::open,
            |query: CardQuery, ()| async move {
                let vector = self
                    .embedder
                    .embed(std::slice::from_ref(&query.text))
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Query embedding request failed");
                        ApplicationError::unhandled(QUERY_FAILED, e)
                    })?
                    .into_iter()
                    .next()
                    .filter(|values| !values.is_empty())
                    .ok_or_else(|| {
                        ApplicationError::empty_result("Failed to generate query embedding")
                    })?;

                tracing::debug!(
                    top_k = query.top_k,
                    filter = ?query.filter,
                    "Querying similar cards"
                );

                self.index
                    .query(vector, QueryOptions::new(query.top_k, query.filter))
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Vectorize query error");
                        ApplicationError::unhandled(QUERY_FAILED, e)
                    })
            },
            |matches: Vec<VectorMatch>| {
                Ok(QueryCardsResponse {
                    matches: matches
                        .into_iter()
                        .map(|m| CardMatch {
                            id: m.id,
                            score: m.score,
                            card: m.metadata,
                        })
                        .collect(),
                })
            },
        )
        .await
    }
}
