//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod cloudflare;
pub mod embedding;
pub mod image;
pub mod retry;
pub mod secrets;
pub mod tts;

pub use cloudflare::{CloudflareApi, CloudflareConfig, CloudflareError, VectorizeClient, WorkersAiEmbedder};
pub use embedding::HashingEmbedder;
pub use image::{ModelRef, ModelRefError, ReplicateClient, ReplicateClientConfig};
pub use retry::RetryPolicy;
pub use secrets::EnvSecretStore;
pub use tts::{ElevenLabsClient, ElevenLabsClientConfig};
