//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::application::BatchPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// ElevenLabs 配置
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,

    /// Replicate 配置
    #[serde(default)]
    pub replicate: ReplicateConfig,

    /// Cloudflare 账户配置
    #[serde(default)]
    pub cloudflare: CloudflareConfig,

    /// 向量索引配置
    #[serde(default)]
    pub vectorize: VectorizeConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8788
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024 // 2 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// ElevenLabs 配置
///
/// API key 不在这里配置，每次请求从环境变量 `ELEVENLABS_API_KEY` 读取
#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsConfig {
    #[serde(default = "default_elevenlabs_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_elevenlabs_timeout")]
    pub timeout_secs: u64,
}

fn default_elevenlabs_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_elevenlabs_timeout() -> u64 {
    60
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_elevenlabs_url(),
            timeout_secs: default_elevenlabs_timeout(),
        }
    }
}

/// Replicate 配置
///
/// API token 每次请求从环境变量 `REPLICATE_API_TOKEN` 读取
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicateConfig {
    #[serde(default = "default_replicate_url")]
    pub base_url: String,

    /// `owner/name` 或 `owner/name:version`
    #[serde(default = "default_replicate_model")]
    pub model: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_replicate_timeout")]
    pub timeout_secs: u64,

    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_replicate_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_replicate_model() -> String {
    "black-forest-labs/flux-schnell".to_string()
}

fn default_replicate_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    500
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            base_url: default_replicate_url(),
            model: default_replicate_model(),
            timeout_secs: default_replicate_timeout(),
            poll_interval_ms: default_poll_interval(),
            retry: RetryConfig::default(),
        }
    }
}

/// 重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 首次重试前的等待时间（毫秒），之后每次翻倍
    #[serde(default = "default_retry_interval")]
    pub interval_ms: u64,

    /// 随机抖动上限（毫秒）
    #[serde(default = "default_retry_jitter")]
    pub jitter_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_interval() -> u64 {
    500
}

fn default_retry_jitter() -> u64 {
    100
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            interval_ms: default_retry_interval(),
            jitter_ms: default_retry_jitter(),
        }
    }
}

/// Cloudflare 账户配置
///
/// 仅 `vectorize.backend = "cloudflare"` 时需要
#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareConfig {
    #[serde(default = "default_cloudflare_url")]
    pub base_url: String,

    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_cloudflare_timeout")]
    pub timeout_secs: u64,
}

fn default_cloudflare_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_cloudflare_timeout() -> u64 {
    30
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            base_url: default_cloudflare_url(),
            account_id: None,
            api_token: None,
            timeout_secs: default_cloudflare_timeout(),
        }
    }
}

/// 向量索引后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorBackend {
    /// 进程内索引 + 本地哈希嵌入
    #[default]
    Memory,
    /// Workers AI + Vectorize
    Cloudflare,
}

/// 向量索引配置
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizeConfig {
    #[serde(default)]
    pub backend: VectorBackend,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// 本地哈希嵌入的维度，与 bge-base 一致
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// 单次查询允许的最大 topK（返回元数据时索引的上限）
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

fn default_index_name() -> String {
    "glesolas-cards".to_string()
}

fn default_embedding_model() -> String {
    "@cf/baai/bge-base-en-v1.5".to_string()
}

fn default_embedding_dimensions() -> usize {
    768
}

fn default_max_top_k() -> usize {
    20
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            index_name: default_index_name(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            max_top_k: default_max_top_k(),
            batch_policy: BatchPolicy::default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
