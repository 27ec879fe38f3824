//! Domain Layer - 领域层
//!
//! 每个接口的请求实体及其校验规则:
//! - audio: 语音合成请求
//! - image: 图片生成请求
//! - card: 卡牌记录与向量
//! - query: 相似查询与元数据过滤

pub mod audio;
pub mod card;
pub mod errors;
pub mod image;
pub mod query;

pub use audio::{AudioRequest, AudioRequestBody, VoiceSettings};
pub use card::{CardMetadata, CardRecord, CardVector, UpsertCards, UpsertCardsBody};
pub use errors::ValidationError;
pub use image::{GenerationParams, ImageRequest, ImageRequestBody};
pub use query::{CardQuery, CardQueryParams, MinThreshold, QueryFilter};
