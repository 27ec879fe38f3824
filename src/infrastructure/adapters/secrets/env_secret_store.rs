//! Env Secret Store - 从进程环境变量读取凭据
//!
//! 每次调用都重新读取，值会去掉首尾空白，空值视为未配置

use crate::application::ports::{Credential, SecretStorePort};

#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }
}

impl SecretStorePort for EnvSecretStore {
    fn get(&self, key: &str) -> Option<Credential> {
        let value = std::env::var(key).ok()?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Credential::new(value))
    }
}
