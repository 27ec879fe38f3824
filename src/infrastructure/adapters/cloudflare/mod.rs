//! Cloudflare Adapter - Workers AI 与 Vectorize 的 REST 客户端
//!
//! 所有接口都返回统一信封：
//! `{"success": bool, "errors": [{"code", "message"}], "result": ...}`

mod api;
mod vectorize_client;
mod workers_ai_client;

pub use api::{CloudflareApi, CloudflareConfig, CloudflareError};
pub use vectorize_client::VectorizeClient;
pub use workers_ai_client::WorkersAiEmbedder;
