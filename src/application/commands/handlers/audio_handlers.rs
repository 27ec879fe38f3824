//! Audio Command Handlers

use std::sync::Arc;

use crate::application::commands::audio_commands::*;
use crate::application::error::ApplicationError;
use crate::application::pipeline::{self, CredentialGate};
use crate::application::ports::{
    Credential, SpeechError, SpeechSynthesizerPort, SynthesizedAudio, ELEVENLABS_API_KEY,
};
use crate::domain::AudioRequest;

const AUDIO_FAILED: &str = "Audio generation failed";

/// GenerateAudio Handler - 文本转语音
pub struct GenerateAudioHandler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    gate: CredentialGate,
}

impl GenerateAudioHandler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>, gate: CredentialGate) -> Self {
        Self { synthesizer, gate }
    }

    pub async fn handle(
        &self,
        cmd: GenerateAudioCommand,
    ) -> Result<GenerateAudioResponse, ApplicationError> {
        let synthesizer = &self.synthesizer;

        pipeline::run(
            cmd.body,
            AudioRequest::validate,
            || self.gate.require(ELEVENLABS_API_KEY, "API key not configured"),
            |request: AudioRequest, credential: Credential| async move {
                tracing::info!(
                    chars = request.char_count(),
                    voice_id = %request.voice_id,
                    model_id = %request.model_id,
                    "Generating audio"
                );

                synthesizer
                    .synthesize(&credential, &request)
                    .await
                    .map_err(map_speech_error)
            },
            |audio: SynthesizedAudio| {
                tracing::info!(bytes = audio.audio_data.len(), "Audio generated successfully");
                Ok(GenerateAudioResponse {
                    audio_data: audio.audio_data,
                    content_type: "audio/mpeg",
                })
            },
        )
        .await
    }
}

fn map_speech_error(err: SpeechError) -> ApplicationError {
    match err {
        SpeechError::Provider { status, body } => {
            tracing::error!(status = status, body = %body, "ElevenLabs API error");
            ApplicationError::provider(AUDIO_FAILED, status, body)
        }
        other => {
            tracing::error!(error = %other, "Audio generation failed");
            ApplicationError::unhandled(AUDIO_FAILED, other)
        }
    }
}
