//! TTS Adapter - ElevenLabs 客户端实现

mod elevenlabs_client;

pub use elevenlabs_client::{ElevenLabsClient, ElevenLabsClientConfig};
