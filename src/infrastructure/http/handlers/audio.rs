//! Audio Handlers - 文本转语音

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::GenerateAudioCommand;
use crate::infrastructure::http::dto::{parse_json_body, CACHE_ONE_HOUR};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/generate-audio
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let cmd = GenerateAudioCommand {
        body: parse_json_body(&body?)?,
    };

    let result = state.generate_audio_handler.handle(cmd).await?;

    let content_length = HeaderValue::from(result.audio_data.len());
    let mut response = Body::from(result.audio_data).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(result.content_type));
    headers.insert(header::CONTENT_LENGTH, content_length);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_ONE_HOUR));
    Ok(response)
}
