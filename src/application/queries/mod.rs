//! 应用层 - 查询（读操作）

mod card_queries;

pub mod handlers;

pub use card_queries::*;
