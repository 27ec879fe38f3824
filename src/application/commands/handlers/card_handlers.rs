//! Card Command Handlers - 卡牌嵌入与写入

use std::sync::Arc;

use crate::application::commands::card_commands::*;
use crate::application::error::ApplicationError;
use crate::application::pipeline;
use crate::application::ports::{EmbeddingPort, UpsertResult, VectorIndexPort};
use crate::domain::{CardVector, UpsertCards};

const UPSERT_FAILED: &str = "Failed to upsert vectors";

/// UpsertCards Handler - 批量嵌入卡牌并写入向量索引
pub struct UpsertCardsHandler {
    embedder: Arc<dyn EmbeddingPort>,
    index: Arc<dyn VectorIndexPort>,
    batch_policy: BatchPolicy,
}

impl UpsertCardsHandler {
    pub fn new(
        embedder: Arc<dyn EmbeddingPort>,
        index: Arc<dyn VectorIndexPort>,
        batch_policy: BatchPolicy,
    ) -> Self {
        Self {
            embedder,
            index,
            batch_policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpsertCardsCommand,
    ) -> Result<UpsertCardsResponse, ApplicationError> {
        pipeline::run(
            cmd.body,
            UpsertCards::validate,
            pipeline::open,
            |upsert: UpsertCards, ()| async move {
                let requested = upsert.cards.len();
                let vectors = self.embed_cards(upsert).await?;

                tracing::info!(
                    requested = requested,
                    embedded = vectors.len(),
                    "Upserting card vectors"
                );

                self.index.upsert(vectors).await.map_err(|e| {
                    tracing::error!(error = %e, "Vectorize upsert error");
                    ApplicationError::unhandled(UPSERT_FAILED, e)
                })
            },
            |result: UpsertResult| {
                Ok(UpsertCardsResponse {
                    count: result.count,
                    ids: result.ids,
                })
            },
        )
        .await
    }

    /// 逐张生成向量（顺序执行）
    async fn embed_cards(&self, upsert: UpsertCards) -> Result<Vec<CardVector>, ApplicationError> {
        let UpsertCards { cards, deck_id } = upsert;
        let mut vectors = Vec::with_capacity(cards.len());

        for card in cards {
            let text = card.embedding_text();
            let values = self
                .embedder
                .embed(std::slice::from_ref(&text))
                .await
                .map_err(|e| {
                    tracing::error!(card_id = %card.id, error = %e, "Embedding request failed");
                    ApplicationError::unhandled(UPSERT_FAILED, e)
                })?
                .into_iter()
                .next()
                .filter(|values| !values.is_empty());

            match (values, self.batch_policy) {
                (Some(values), _) => {
                    vectors.push(CardVector::new(card, values, deck_id.as_deref()));
                }
                (None, BatchPolicy::BestEffort) => {
                    tracing::warn!(
                        card_id = %card.id,
                        "Failed to generate embedding for card, skipping"
                    );
                }
                (None, BatchPolicy::FailFast) => {
                    return Err(ApplicationError::unhandled(
                        UPSERT_FAILED,
                        format!("Failed to generate embedding for card {}", card.id),
                    ));
                }
            }
        }

        Ok(vectors)
    }
}
