//! Speech Synthesizer Port - 语音合成服务抽象
//!
//! 具体实现在 infrastructure/adapters/tts

use async_trait::async_trait;
use thiserror::Error;

use super::secret_store::Credential;
use crate::domain::AudioRequest;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum SpeechError {
    /// 服务端返回非 2xx，body 为原始错误文本
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// MP3 音频数据
    pub audio_data: Vec<u8>,
}

/// Speech Synthesizer Port
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成语音，只尝试一次，不重试
    async fn synthesize(
        &self,
        credential: &Credential,
        request: &AudioRequest,
    ) -> Result<SynthesizedAudio, SpeechError>;
}
