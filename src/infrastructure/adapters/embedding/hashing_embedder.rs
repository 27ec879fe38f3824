//! Hashing Embedder - 本地确定性嵌入
//!
//! 没有配置 Cloudflare 账户时使用：把小写单词经 FNV-1a 哈希映射到固定维度，
//! 哈希最高位决定符号，最后做 L2 归一化。
//! 没有任何单词的文本返回空向量

use async_trait::async_trait;

use crate::application::ports::{EmbeddingError, EmbeddingPort};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0.0f32; self.dimensions];
        let mut seen = false;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let index = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            values[index] += sign;
            seen = true;
        }

        if !seen {
            return Vec::new();
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        values
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(768)
    }
}

#[async_trait]
impl EmbeddingPort for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
