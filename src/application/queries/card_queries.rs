//! Card Queries - 相似卡牌查询

use serde_json::Value;

use crate::domain::CardQueryParams;

/// 相似卡牌查询
#[derive(Debug, Default)]
pub struct QueryCards {
    pub params: CardQueryParams,
}

/// 单条匹配
#[derive(Debug, Clone, PartialEq)]
pub struct CardMatch {
    pub id: String,
    pub score: f32,
    /// 索引中保存的卡牌元数据
    pub card: Option<Value>,
}

/// 查询响应
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCardsResponse {
    pub matches: Vec<CardMatch>,
}
