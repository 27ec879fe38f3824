//! HTTP Middleware
//!
//! 请求 ID + HTTP 状态码错误日志

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// 响应头中的请求 ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP 状态码错误日志中间件
///
/// 为每个请求生成 ID 写入响应头，状态码为 4xx 或 5xx 时带上该 ID 记录日志。
/// 错误体的内容在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
