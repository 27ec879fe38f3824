//! Secret Store Port - 凭据来源抽象
//!
//! 每次请求都重新读取，不在进程内缓存

use std::fmt;

/// ElevenLabs API key 的环境变量名
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";

/// Replicate API token 的环境变量名
pub const REPLICATE_API_TOKEN: &str = "REPLICATE_API_TOKEN";

/// 凭据
///
/// Debug 输出不包含明文
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// 取出明文（仅在构造出站请求时使用）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Secret Store Port
pub trait SecretStorePort: Send + Sync {
    /// 读取指定名称的凭据，未配置或为空时返回 None
    fn get(&self, key: &str) -> Option<Credential>;
}
