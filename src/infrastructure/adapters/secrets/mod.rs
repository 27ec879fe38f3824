//! Secrets Adapter

mod env_secret_store;

pub use env_secret_store::EnvSecretStore;
