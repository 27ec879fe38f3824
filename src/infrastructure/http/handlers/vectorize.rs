//! Vectorize Handlers - 卡牌向量写入与相似查询
//!
//! 这组接口的错误体用 `message` 字段承载详情

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use std::sync::Arc;

use crate::application::{QueryCards, UpsertCardsCommand};
use crate::domain::{CardQueryParams, ValidationError};
use crate::infrastructure::http::dto::{parse_json_body, QueryResponse, UpsertResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/vectorize
pub async fn upsert_cards(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::from(e).details_as_message())?;
    let cmd = UpsertCardsCommand {
        body: parse_json_body(&body).map_err(|e| ApiError::from(e).details_as_message())?,
    };

    let result = state
        .upsert_cards_handler
        .handle(cmd)
        .await
        .map_err(|e| ApiError::from(e).details_as_message())?;

    Ok(Json(result.into()))
}

/// GET /api/vectorize?q=&topK=&deckId=&minMight=&minFortune=&minCunning=
pub async fn query_cards(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CardQueryParams>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(params) = params.map_err(|e| {
        ApiError::from(ValidationError::invalid_with_details(
            "Invalid query string",
            e.body_text(),
        ))
        .details_as_message()
    })?;

    let result = state
        .query_cards_handler
        .handle(QueryCards { params })
        .await
        .map_err(|e| ApiError::from(e).details_as_message())?;

    Ok(Json(result.into()))
}
