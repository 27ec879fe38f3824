//! 模型引用
//!
//! 格式：`owner/name`（走模型端点，使用最新版本）或 `owner/name:version`（走版本端点）

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid reference to model version: {0}. Expected format: owner/name or owner/name:version")]
pub struct ModelRefError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl FromStr for ModelRef {
    type Err = ModelRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelRefError(s.to_string());

        let (owner, rest) = s.split_once('/').ok_or_else(invalid)?;
        let (name, version) = match rest.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (rest, None),
        };

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        if version.is_some_and(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}
