//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    BatchPolicy, CredentialGate, EmbeddingPort, GenerateAudioHandler, GenerateImageHandler,
    ImageGeneratorPort, QueryCardsHandler, SecretStorePort, SpeechSynthesizerPort,
    UpsertCardsHandler, VectorIndexPort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub generate_audio_handler: GenerateAudioHandler,
    pub generate_image_handler: GenerateImageHandler,
    pub upsert_cards_handler: UpsertCardsHandler,

    // ========== Query Handlers ==========
    pub query_cards_handler: QueryCardsHandler,

    /// 当前向量后端名称
    pub vector_backend: &'static str,
}

/// 构建 AppState 所需的端口与设置
pub struct AppPorts {
    pub secrets: Arc<dyn SecretStorePort>,
    pub speech: Arc<dyn SpeechSynthesizerPort>,
    pub images: Arc<dyn ImageGeneratorPort>,
    pub embedder: Arc<dyn EmbeddingPort>,
    pub index: Arc<dyn VectorIndexPort>,
    pub batch_policy: BatchPolicy,
    pub max_top_k: usize,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts) -> Self {
        let gate = CredentialGate::new(ports.secrets);
        let vector_backend = ports.index.backend();

        Self {
            // Command handlers
            generate_audio_handler: GenerateAudioHandler::new(ports.speech, gate.clone()),
            generate_image_handler: GenerateImageHandler::new(ports.images, gate),
            upsert_cards_handler: UpsertCardsHandler::new(
                ports.embedder.clone(),
                ports.index.clone(),
                ports.batch_policy,
            ),

            // Query handlers
            query_cards_handler: QueryCardsHandler::new(
                ports.embedder,
                ports.index,
                ports.max_top_k,
            ),

            vector_backend,
        }
    }
}
