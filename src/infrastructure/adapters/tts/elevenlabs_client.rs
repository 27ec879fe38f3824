//! ElevenLabs Client - 调用 ElevenLabs 文本转语音接口
//!
//! 实现 SpeechSynthesizerPort
//!
//! ElevenLabs API:
//! POST {base_url}/v1/text-to-speech/{voice_id}
//! Headers: xi-api-key
//! Request: {"text": "...", "model_id": "...", "voice_settings": {...}}  (JSON)
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{Credential, SpeechError, SpeechSynthesizerPort, SynthesizedAudio};
use crate::domain::{AudioRequest, VoiceSettings};

/// 请求体
#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ElevenLabsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ElevenLabsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// ElevenLabs 客户端
///
/// 每次合成只发一次请求，失败直接上报
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// `voice_id` 作为单独的路径段编码
    fn speech_url(&self, voice_id: &str) -> Result<Url, SpeechError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| SpeechError::Network(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SpeechError::Network("Invalid base URL".to_string()))?
            .pop_if_empty()
            .extend(["v1", "text-to-speech", voice_id]);
        Ok(url)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for ElevenLabsClient {
    async fn synthesize(
        &self,
        credential: &Credential,
        request: &AudioRequest,
    ) -> Result<SynthesizedAudio, SpeechError> {
        let url = self.speech_url(&request.voice_id)?;
        let body = TextToSpeechRequest {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: &request.voice_settings,
        };

        tracing::debug!(
            url = %url,
            text_chars = request.char_count(),
            voice_id = %request.voice_id,
            model_id = %request.model_id,
            "Sending text-to-speech request"
        );

        let response = self
            .client
            .post(url)
            .header("xi-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechError::Timeout
                } else {
                    SpeechError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "ElevenLabs returned an error");
            return Err(SpeechError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        tracing::info!(
            voice_id = %request.voice_id,
            audio_size = audio_data.len(),
            "Speech synthesis completed"
        );

        Ok(SynthesizedAudio { audio_data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ElevenLabsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_config_builder() {
        let config = ElevenLabsClientConfig::new("http://127.0.0.1:9000").with_timeout(5);
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_speech_url_encodes_voice_id() {
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::new("http://localhost:1/")).unwrap();
        let url = client.speech_url("a/b c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:1/v1/text-to-speech/a%2Fb%20c");
    }

    #[test]
    fn test_speech_url_default_voice() {
        let client = ElevenLabsClient::new(ElevenLabsClientConfig::default()).unwrap();
        let url = client.speech_url("JBFqnCBsd6RMkjVDRZzb").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb"
        );
    }
}
