//! Glesolas API - 卡牌游戏的 AI 代理服务
//!
//! - Domain: 请求实体与校验
//! - Application: pipeline, commands, queries, ports
//! - Infrastructure: http, memory, adapters

use std::sync::Arc;
use std::time::Duration;

use glesolas_api::application::{Credential, EmbeddingPort, VectorIndexPort};
use glesolas_api::config::{load_config, print_config, AppConfig, VectorBackend};
use glesolas_api::infrastructure::adapters::{
    CloudflareApi, CloudflareConfig, ElevenLabsClient, ElevenLabsClientConfig, EnvSecretStore,
    HashingEmbedder, ModelRef, ReplicateClient, ReplicateClientConfig, RetryPolicy,
    VectorizeClient, WorkersAiEmbedder,
};
use glesolas_api::infrastructure::http::{AppPorts, AppState, HttpServer, ServerConfig};
use glesolas_api::infrastructure::memory::InMemoryVectorIndex;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},glesolas_api={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置选择嵌入与索引后端
fn build_vector_backend(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn EmbeddingPort>, Arc<dyn VectorIndexPort>)> {
    match config.vectorize.backend {
        VectorBackend::Memory => {
            let embedder: Arc<dyn EmbeddingPort> =
                Arc::new(HashingEmbedder::new(config.vectorize.embedding_dimensions));
            let index: Arc<dyn VectorIndexPort> = InMemoryVectorIndex::new().arc();
            Ok((embedder, index))
        }
        VectorBackend::Cloudflare => {
            // 加载时已校验
            let account_id = config.cloudflare.account_id.clone().unwrap_or_default();
            let api_token = config.cloudflare.api_token.clone().unwrap_or_default();

            let cf_config =
                CloudflareConfig::new(account_id.trim(), Credential::new(api_token.trim()))
                    .with_base_url(&config.cloudflare.base_url)
                    .with_timeout(config.cloudflare.timeout_secs);
            let api = Arc::new(CloudflareApi::new(cf_config)?);

            let embedder: Arc<dyn EmbeddingPort> = Arc::new(WorkersAiEmbedder::new(
                api.clone(),
                &config.vectorize.embedding_model,
            ));
            let index: Arc<dyn VectorIndexPort> =
                Arc::new(VectorizeClient::new(api, &config.vectorize.index_name));
            Ok((embedder, index))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Glesolas API v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 语音合成
    let speech = ElevenLabsClient::new(
        ElevenLabsClientConfig::new(&config.elevenlabs.base_url)
            .with_timeout(config.elevenlabs.timeout_secs),
    )?;

    // 图片生成
    let model: ModelRef = config.replicate.model.parse()?;
    let retry = RetryPolicy {
        max_retries: config.replicate.retry.max_retries,
        interval: Duration::from_millis(config.replicate.retry.interval_ms),
        jitter: Duration::from_millis(config.replicate.retry.jitter_ms),
    };
    let images = ReplicateClient::new(
        ReplicateClientConfig::new(&config.replicate.base_url)
            .with_model(model)
            .with_timeout(config.replicate.timeout_secs)
            .with_poll_interval(Duration::from_millis(config.replicate.poll_interval_ms))
            .with_retry(retry),
    )?;

    // 嵌入与向量索引
    let (embedder, index) = build_vector_backend(&config)?;

    let state = AppState::new(AppPorts {
        secrets: Arc::new(EnvSecretStore::new()),
        speech: Arc::new(speech),
        images: Arc::new(images),
        embedder,
        index,
        batch_policy: config.vectorize.batch_policy,
        max_top_k: config.vectorize.max_top_k,
    });

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_body_limit(config.server.body_limit_bytes);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    // 无法监听信号时不主动关闭
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
