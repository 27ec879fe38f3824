//! Memory Layer - In-Memory State
//!
//! 本地运行与测试使用的内存向量索引

mod vector_index;

pub use vector_index::InMemoryVectorIndex;
