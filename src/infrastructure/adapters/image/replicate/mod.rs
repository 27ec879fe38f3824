//! Replicate Adapter

mod client;
mod model_ref;
mod prediction;

pub use client::{ReplicateClient, ReplicateClientConfig};
pub use model_ref::{ModelRef, ModelRefError};
pub use prediction::{Prediction, PredictionStatus};
