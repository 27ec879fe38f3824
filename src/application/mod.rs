//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 出站端口定义（语音合成、图片生成、嵌入、向量索引、凭据来源）
//! - pipeline: 校验 → 凭据 → 出站调用 → 响应映射
//! - commands: 生成与写入类用例
//! - queries: 查询类用例
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Audio
    GenerateAudioCommand,
    GenerateAudioResponse,
    // Image
    GenerateImageCommand,
    GenerateImageResponse,
    // Cards
    BatchPolicy,
    UpsertCardsCommand,
    UpsertCardsResponse,
    // Handlers
    handlers::{GenerateAudioHandler, GenerateImageHandler, UpsertCardsHandler},
};

pub use error::ApplicationError;

pub use pipeline::CredentialGate;

pub use ports::{
    Credential, EmbeddingError, EmbeddingPort, ImageError, ImageGeneratorPort, QueryOptions,
    SecretStorePort, SpeechError, SpeechSynthesizerPort, SynthesizedAudio, UpsertResult,
    VectorIndexError, VectorIndexPort, VectorMatch, ELEVENLABS_API_KEY, REPLICATE_API_TOKEN,
};

pub use queries::{handlers::QueryCardsHandler, CardMatch, QueryCards, QueryCardsResponse};
