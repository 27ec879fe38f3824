//! Image Adapter - 图片生成服务实现

pub mod replicate;

pub use replicate::{ModelRef, ModelRefError, ReplicateClient, ReplicateClientConfig};
