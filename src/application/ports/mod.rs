//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod embedding;
mod image_generator;
mod secret_store;
mod speech_synthesizer;
mod vector_index;

pub use embedding::{EmbeddingError, EmbeddingPort};
pub use image_generator::{ImageError, ImageGeneratorPort};
pub use secret_store::{Credential, SecretStorePort, ELEVENLABS_API_KEY, REPLICATE_API_TOKEN};
pub use speech_synthesizer::{SpeechError, SpeechSynthesizerPort, SynthesizedAudio};
pub use vector_index::{QueryOptions, UpsertResult, VectorIndexError, VectorIndexPort, VectorMatch};
