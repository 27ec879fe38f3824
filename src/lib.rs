//! Glesolas API - 卡牌游戏的 AI 代理服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 语音、图片、卡牌写入、卡牌查询四类请求及其校验
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechSynthesizer, ImageGenerator, Embedding, VectorIndex, SecretStore）
//! - Pipeline: 校验 → 凭据 → 出站调用 → 响应
//! - Commands / Queries: 用例处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: ElevenLabs, Replicate, Workers AI, Vectorize, 本地嵌入, 环境变量凭据
//! - Memory: 内存向量索引

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
