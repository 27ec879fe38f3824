//! HTTP Routes
//!
//! API Endpoints:
//! - /api/generate-audio    POST  文本转语音（audio/mpeg）
//! - /api/generate-image    POST  文生图（返回图片 URL）
//! - /api/vectorize         POST  写入卡牌向量
//! - /api/vectorize         GET   相似卡牌查询
//! - /api/ping              GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/generate-audio", post(handlers::generate_audio))
        .route("/generate-image", post(handlers::generate_image))
        .route(
            "/vectorize",
            post(handlers::upsert_cards).get(handlers::query_cards),
        )
}
