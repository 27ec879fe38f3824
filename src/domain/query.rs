//! Card Query - 相似卡牌查询
//!
//! 过滤条件只由实际传入的参数构成，未传入的阈值不会出现在过滤对象中

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ValidationError;

/// 默认返回条数
pub const DEFAULT_TOP_K: usize = 5;

/// 数值下限条件（`{"$gte": n}`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinThreshold {
    #[serde(rename = "$gte")]
    pub gte: i64,
}

/// 元数据过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryFilter {
    #[serde(rename = "deckId", skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub might: Option<MinThreshold>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fortune: Option<MinThreshold>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cunning: Option<MinThreshold>,
}

impl QueryFilter {
    pub fn is_empty(&self) -> bool {
        self.deck_id.is_none()
            && self.might.is_none()
            && self.fortune.is_none()
            && self.cunning.is_none()
    }

    /// 判断元数据是否满足过滤条件
    pub fn matches(&self, metadata: &Value) -> bool {
        if let Some(deck_id) = &self.deck_id {
            if metadata.get("deckId").and_then(Value::as_str) != Some(deck_id.as_str()) {
                return false;
            }
        }

        [
            ("might", self.might),
            ("fortune", self.fortune),
            ("cunning", self.cunning),
        ]
        .into_iter()
        .all(|(key, threshold)| match threshold {
            None => true,
            Some(t) => metadata
                .get(key)
                .and_then(Value::as_f64)
                .is_some_and(|v| v >= t.gte as f64),
        })
    }
}

/// 原始查询参数（未校验）
#[derive(Debug, Default, Deserialize)]
pub struct CardQueryParams {
    pub q: Option<String>,
    #[serde(rename = "topK")]
    pub top_k: Option<String>,
    #[serde(rename = "deckId")]
    pub deck_id: Option<String>,
    #[serde(rename = "minMight")]
    pub min_might: Option<String>,
    #[serde(rename = "minFortune")]
    pub min_fortune: Option<String>,
    #[serde(rename = "minCunning")]
    pub min_cunning: Option<String>,
}

/// 已校验的相似查询
#[derive(Debug, Clone, PartialEq)]
pub struct CardQuery {
    pub text: String,
    pub top_k: usize,
    pub filter: QueryFilter,
}

impl CardQuery {
    /// 校验查询参数
    ///
    /// `max_top_k` 为索引单次可返回的最大条数
    pub fn validate(params: CardQueryParams, max_top_k: usize) -> Result<Self, ValidationError> {
        let text = match params.q {
            Some(q) if !q.is_empty() => q,
            _ => return Err(ValidationError::Required("Query text required")),
        };

        let top_k = match present(params.top_k) {
            None => DEFAULT_TOP_K,
            Some(raw) => {
                let top_k: usize = raw.trim().parse().map_err(|_| {
                    ValidationError::invalid_with_details(
                        "Invalid topK",
                        format!("expected a positive integer, got {:?}", raw),
                    )
                })?;
                if top_k == 0 || top_k > max_top_k {
                    return Err(ValidationError::invalid_with_details(
                        "Invalid topK",
                        format!("topK must be between 1 and {}", max_top_k),
                    ));
                }
                top_k
            }
        };

        let filter = QueryFilter {
            deck_id: present(params.deck_id),
            might: threshold("minMight", params.min_might)?,
            fortune: threshold("minFortune", params.min_fortune)?,
            cunning: threshold("minCunning", params.min_cunning)?,
        };

        Ok(Self {
            text,
            top_k,
            filter,
        })
    }
}

/// 空字符串视同未传
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn threshold(name: &str, raw: Option<String>) -> Result<Option<MinThreshold>, ValidationError> {
    present(raw)
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map(|gte| MinThreshold { gte })
                .map_err(|_| {
                    ValidationError::invalid_with_details(
                        format!("Invalid {}", name),
                        format!("expected an integer, got {:?}", raw),
                    )
                })
        })
        .transpose()
}
