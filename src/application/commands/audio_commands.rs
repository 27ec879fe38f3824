//! Audio Commands - 语音合成命令

use crate::domain::AudioRequestBody;

/// 生成语音命令
#[derive(Debug, Default)]
pub struct GenerateAudioCommand {
    pub body: AudioRequestBody,
}

/// 生成语音响应
#[derive(Debug, Clone)]
pub struct GenerateAudioResponse {
    pub audio_data: Vec<u8>,
    pub content_type: &'static str,
}
