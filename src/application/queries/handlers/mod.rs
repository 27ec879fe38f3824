//! Query Handlers 实现

mod card_handlers;

pub use card_handlers::*;
