//! Card Vectors - 卡牌向量化
//!
//! 卡牌记录 → 嵌入文本 → 带元数据的向量

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ValidationError;

/// 卡牌记录（上传入参）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub might: f64,
    pub fortune: f64,
    pub cunning: f64,
    pub category: String,
}

impl CardRecord {
    /// 生成用于嵌入的文本
    ///
    /// 格式固定：`{name}: {description}. Stats - Might: X, Fortune: Y, Cunning: Z`
    pub fn embedding_text(&self) -> String {
        format!(
            "{}: {}. Stats - Might: {}, Fortune: {}, Cunning: {}",
            self.name, self.description, self.might, self.fortune, self.cunning
        )
    }
}

/// 向量元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMetadata {
    pub name: String,
    pub description: String,
    pub might: f64,
    pub fortune: f64,
    pub cunning: f64,
    pub category: String,
    /// 仅在上传时提供了 deckId 才写入
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
}

/// 待写入向量索引的卡牌向量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: CardMetadata,
}

impl CardVector {
    pub fn new(card: CardRecord, values: Vec<f32>, deck_id: Option<&str>) -> Self {
        Self {
            id: card.id,
            values,
            metadata: CardMetadata {
                name: card.name,
                description: card.description,
                might: card.might,
                fortune: card.fortune,
                cunning: card.cunning,
                category: card.category,
                deck_id: deck_id.map(str::to_string),
            },
        }
    }
}

/// 原始上传请求体（未校验）
#[derive(Debug, Default, Deserialize)]
pub struct UpsertCardsBody {
    #[serde(default)]
    pub cards: Option<Value>,
    #[serde(default, rename = "deckId")]
    pub deck_id: Option<String>,
}

/// 已校验的批量上传请求
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCards {
    pub cards: Vec<CardRecord>,
    pub deck_id: Option<String>,
}

impl UpsertCards {
    pub fn validate(body: UpsertCardsBody) -> Result<Self, ValidationError> {
        let cards = match body.cards {
            Some(cards @ Value::Array(_)) => cards,
            _ => return Err(ValidationError::Required("Invalid cards array")),
        };

        let cards: Vec<CardRecord> = serde_json::from_value(cards).map_err(|e| {
            ValidationError::invalid_with_details("Invalid card record", e.to_string())
        })?;

        Ok(Self {
            cards,
            deck_id: body.deck_id.filter(|id| !id.is_empty()),
        })
    }
}
