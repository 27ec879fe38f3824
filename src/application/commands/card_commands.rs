//! Card Commands - 卡牌向量写入命令

use serde::Deserialize;

use crate::domain::UpsertCardsBody;

/// 批量嵌入失败策略
///
/// - `BestEffort`: 单张卡牌没有返回向量时记录日志并跳过
/// - `FailFast`: 任一卡牌没有返回向量即中止整批
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    #[default]
    BestEffort,
    FailFast,
}

/// 批量写入卡牌向量命令
#[derive(Debug, Default)]
pub struct UpsertCardsCommand {
    pub body: UpsertCardsBody,
}

/// 批量写入响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertCardsResponse {
    pub count: usize,
    pub ids: Vec<String>,
}
