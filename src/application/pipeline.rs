//! Proxy Pipeline - 校验 → 凭据检查 → 出站调用 → 结果映射
//!
//! 所有接口共用同一条流水线，各用例只提供四个步骤的具体实现。
//! 步骤顺序固定：客户端错误先于配置错误报告，凭据缺失时不会发起任何出站调用。

use std::future::Future;
use std::sync::Arc;

use super::error::ApplicationError;
use super::ports::{Credential, SecretStorePort};
use crate::domain::ValidationError;

/// 执行流水线
///
/// - `validate`: 把原始输入转换为已校验请求
/// - `gate`: 检查凭据，返回出站调用所需的授权信息
/// - `call`: 出站调用
/// - `respond`: 把调用结果映射为用例响应
pub async fn run<Input, Valid, Grant, Output, Response, Call, Fut>(
    input: Input,
    validate: impl FnOnce(Input) -> Result<Valid, ValidationError>,
    gate: impl FnOnce() -> Result<Grant, ApplicationError>,
    call: Call,
    respond: impl FnOnce(Output) -> Result<Response, ApplicationError>,
) -> Result<Response, ApplicationError>
where
    Call: FnOnce(Valid, Grant) -> Fut,
    Fut: Future<Output = Result<Output, ApplicationError>>,
{
    let valid = validate(input)?;
    let grant = gate()?;
    let output = call(valid, grant).await?;
    respond(output)
}

/// 不需要凭据的接口使用的 gate
pub fn open() -> Result<(), ApplicationError> {
    Ok(())
}

/// Credential Gate - 出站调用前的凭据检查
#[derive(Clone)]
pub struct CredentialGate {
    secrets: Arc<dyn SecretStorePort>,
}

impl CredentialGate {
    pub fn new(secrets: Arc<dyn SecretStorePort>) -> Self {
        Self { secrets }
    }

    /// 读取凭据，缺失时返回配置错误
    pub fn require(
        &self,
        key: &'static str,
        missing_message: &'static str,
    ) -> Result<Credential, ApplicationError> {
        self.secrets.get(key).ok_or_else(|| {
            tracing::error!(key = key, "Credential not found in environment");
            ApplicationError::configuration(missing_message)
        })
    }
}
