//! Embedding Adapter - 本地嵌入实现

mod hashing_embedder;

pub use hashing_embedder::HashingEmbedder;
