//! Image Handlers - 文生图

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::application::GenerateImageCommand;
use crate::infrastructure::http::dto::{parse_json_body, ImageResponse, CACHE_ONE_HOUR};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/generate-image
///
/// 客户端断开时，处理函数的 future 被丢弃，进行中的预测随之取消
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = GenerateImageCommand {
        body: parse_json_body(&body?)?,
    };

    let result = state.generate_image_handler.handle(cmd).await?;

    Ok((
        [(header::CACHE_CONTROL, CACHE_ONE_HOUR)],
        Json(ImageResponse::from(result)),
    ))
}
