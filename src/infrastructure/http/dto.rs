//! Data Transfer Objects

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::application::{CardMatch, GenerateImageResponse, QueryCardsResponse, UpsertCardsResponse};
use crate::domain::ValidationError;

/// 一小时公共缓存
pub const CACHE_ONE_HOUR: &str = "public, max-age=3600";

/// 解析 JSON 请求体
///
/// 非法 JSON 属于客户端错误
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ValidationError> {
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::invalid_with_details("Invalid JSON body", e.to_string()))
}

// ============================================================================
// Image
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
    pub prompt: String,
}

impl From<GenerateImageResponse> for ImageResponse {
    fn from(r: GenerateImageResponse) -> Self {
        Self {
            image_url: r.image_url,
            prompt: r.prompt,
        }
    }
}

// ============================================================================
// Vectorize
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
    pub count: usize,
    pub ids: Vec<String>,
}

impl From<UpsertCardsResponse> for UpsertResponse {
    fn from(r: UpsertCardsResponse) -> Self {
        Self {
            success: true,
            count: r.count,
            ids: r.ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchDto {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Value>,
}

impl From<CardMatch> for MatchDto {
    fn from(m: CardMatch) -> Self {
        Self {
            id: m.id,
            score: m.score,
            card: m.card,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub matches: Vec<MatchDto>,
}

impl From<QueryCardsResponse> for QueryResponse {
    fn from(r: QueryCardsResponse) -> Self {
        Self {
            success: true,
            matches: r.matches.into_iter().map(MatchDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioRequestBody;
    use serde_json::json;

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_json_body::<AudioRequestBody>(&Bytes::from_static(b"{not json"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");
        assert!(err.details().is_some());
    }

    #[test]
    fn test_parse_empty_object() {
        let body = parse_json_body::<AudioRequestBody>(&Bytes::from_static(b"{}")).unwrap();
        assert!(body.text.is_none());
    }

    #[test]
    fn test_image_response_is_camel_case() {
        let dto = ImageResponse::from(GenerateImageResponse {
            image_url: "https://x/y.jpg".to_string(),
            prompt: "a fox".to_string(),
        });
        assert_eq!(
            serde_json::to_value(dto).unwrap(),
            json!({"imageUrl": "https://x/y.jpg", "prompt": "a fox"})
        );
    }

    #[test]
    fn test_query_response_shape() {
        let dto = QueryResponse::from(QueryCardsResponse {
            matches: vec![CardMatch {
                id: "c1".to_string(),
                score: 0.5,
                card: Some(json!({"name": "Ember Fox"})),
            }],
        });
        assert_eq!(
            serde_json::to_value(dto).unwrap(),
            json!({
                "success": true,
                "matches": [{"id": "c1", "score": 0.5, "card": {"name": "Ember Fox"}}],
            })
        );
    }
}
