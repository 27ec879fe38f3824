//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, VectorBackend};
use crate::infrastructure::adapters::ModelRef;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `GLESOLAS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `GLESOLAS_SERVER__PORT=8080`
/// - `GLESOLAS_REPLICATE__MODEL=black-forest-labs/flux-dev`
/// - `GLESOLAS_VECTORIZE__BACKEND=cloudflare`
/// - `GLESOLAS_CLOUDFLARE__ACCOUNT_ID=...`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8788)?
        .set_default("elevenlabs.base_url", "https://api.elevenlabs.io")?
        .set_default("elevenlabs.timeout_secs", 60)?
        .set_default("replicate.base_url", "https://api.replicate.com/v1")?
        .set_default("replicate.model", "black-forest-labs/flux-schnell")?
        .set_default("replicate.timeout_secs", 120)?
        .set_default("replicate.poll_interval_ms", 500)?
        .set_default("cloudflare.base_url", "https://api.cloudflare.com/client/v4")?
        .set_default("cloudflare.timeout_secs", 30)?
        .set_default("vectorize.backend", "memory")?
        .set_default("vectorize.index_name", "glesolas-cards")?
        .set_default("vectorize.max_top_k", 20)?
        .set_default("vectorize.batch_policy", "best_effort")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: GLESOLAS_VECTORIZE__BACKEND=cloudflare
    builder = builder.add_source(
        Environment::with_prefix("GLESOLAS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("Server port cannot be 0"));
    }

    for (name, url) in [
        ("elevenlabs.base_url", &config.elevenlabs.base_url),
        ("replicate.base_url", &config.replicate.base_url),
        ("cloudflare.base_url", &config.cloudflare.base_url),
    ] {
        if url.trim().is_empty() {
            return Err(invalid(format!("{} cannot be empty", name)));
        }
    }

    config
        .replicate
        .model
        .parse::<ModelRef>()
        .map_err(|e| invalid(e.to_string()))?;

    if config.replicate.poll_interval_ms == 0 {
        return Err(invalid("replicate.poll_interval_ms cannot be 0"));
    }

    if config.vectorize.max_top_k == 0 {
        return Err(invalid("vectorize.max_top_k cannot be 0"));
    }

    if config.vectorize.embedding_dimensions == 0 {
        return Err(invalid("vectorize.embedding_dimensions cannot be 0"));
    }

    if config.vectorize.backend == VectorBackend::Cloudflare {
        if is_blank(&config.cloudflare.account_id) || is_blank(&config.cloudflare.api_token) {
            return Err(invalid(
                "cloudflare.account_id and cloudflare.api_token are required for the cloudflare backend",
            ));
        }
        if config.vectorize.index_name.trim().is_empty() {
            return Err(invalid("vectorize.index_name cannot be empty"));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
///
/// 不输出任何凭据
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("ElevenLabs URL: {}", config.elevenlabs.base_url);
    tracing::info!("ElevenLabs Timeout: {}s", config.elevenlabs.timeout_secs);
    tracing::info!("Replicate URL: {}", config.replicate.base_url);
    tracing::info!("Replicate Model: {}", config.replicate.model);
    tracing::info!("Replicate Poll Interval: {}ms", config.replicate.poll_interval_ms);
    tracing::info!("Replicate Max Retries: {}", config.replicate.retry.max_retries);
    tracing::info!("Vector Backend: {:?}", config.vectorize.backend);
    if config.vectorize.backend == VectorBackend::Cloudflare {
        tracing::info!("Cloudflare URL: {}", config.cloudflare.base_url);
        tracing::info!("Vectorize Index: {}", config.vectorize.index_name);
        tracing::info!("Embedding Model: {}", config.vectorize.embedding_model);
    } else {
        tracing::info!("Embedding Dimensions: {}", config.vectorize.embedding_dimensions);
    }
    tracing::info!("Max topK: {}", config.vectorize.max_top_k);
    tracing::info!("Batch Policy: {:?}", config.vectorize.batch_policy);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BatchPolicy;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validation_passes_for_default_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_model_ref() {
        let mut config = AppConfig::default();
        config.replicate.model = "flux".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn test_cloudflare_backend_requires_account() {
        let mut config = AppConfig::default();
        config.vectorize.backend = VectorBackend::Cloudflare;
        assert!(validate_config(&config).is_err());

        config.cloudflare.account_id = Some("acct".to_string());
        config.cloudflare.api_token = Some("  ".to_string());
        assert!(validate_config(&config).is_err());

        config.cloudflare.api_token = Some("token".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[server]
port = 9100

[replicate]
model = "stability-ai/sdxl:39ed52f2"
poll_interval_ms = 250

[replicate.retry]
max_retries = 2

[vectorize]
batch_policy = "fail_fast"
max_top_k = 10
"#,
        );

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.replicate.model, "stability-ai/sdxl:39ed52f2");
        assert_eq!(config.replicate.poll_interval_ms, 250);
        assert_eq!(config.replicate.retry.max_retries, 2);
        assert_eq!(config.replicate.retry.interval_ms, 500);
        assert_eq!(config.vectorize.batch_policy, BatchPolicy::FailFast);
        assert_eq!(config.vectorize.max_top_k, 10);
        assert_eq!(config.vectorize.backend, VectorBackend::Memory);
        assert_eq!(config.elevenlabs.base_url, "https://api.elevenlabs.io");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let file = write_config(
            r#"
[vectorize]
backend = "cloudflare"
"#,
        );
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
