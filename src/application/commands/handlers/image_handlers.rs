//! Image Command Handlers

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::application::commands::image_commands::*;
use crate::application::error::ApplicationError;
use crate::application::pipeline::{self, CredentialGate};
use crate::application::ports::{Credential, ImageError, ImageGeneratorPort, REPLICATE_API_TOKEN};
use crate::domain::ImageRequest;

const IMAGE_FAILED: &str = "Image generation failed";
const NO_IMAGES: &str = "No images generated";

/// GenerateImage Handler - 文生图
pub struct GenerateImageHandler {
    generator: Arc<dyn ImageGeneratorPort>,
    gate: CredentialGate,
}

impl GenerateImageHandler {
    pub fn new(generator: Arc<dyn ImageGeneratorPort>, gate: CredentialGate) -> Self {
        Self { generator, gate }
    }

    pub async fn handle(
        &self,
        cmd: GenerateImageCommand,
    ) -> Result<GenerateImageResponse, ApplicationError> {
        pipeline::run(
            cmd.body,
            ImageRequest::validate,
            || self.gate.require(REPLICATE_API_TOKEN, "API token not configured"),
            |request: ImageRequest, credential: Credential| async move {
                tracing::info!(prompt = %request.prompt, "Generating image");
                let prompt = request.prompt.clone();
                let output = self.run_detached(credential, request).await?;
                Ok((prompt, output))
            },
            |(prompt, output): (String, Value)| {
                let image_url = first_image_url(&output).ok_or_else(|| {
                    tracing::error!(output = %output, "No images generated");
                    ApplicationError::empty_result(NO_IMAGES)
                })?;
                tracing::info!(image_url = %image_url, "Image generated successfully");
                Ok(GenerateImageResponse { image_url, prompt })
            },
        )
        .await
    }

    /// 在独立任务中运行生成
    ///
    /// 请求 future 被丢弃（客户端断开）时 drop guard 取消令牌，
    /// 生成任务据此取消仍在运行的预测
    async fn run_detached(
        &self,
        credential: Credential,
        request: ImageRequest,
    ) -> Result<Value, ApplicationError> {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let generator = Arc::clone(&self.generator);

        let task = tokio::spawn(async move {
            generator.generate(&credential, &request, cancel).await
        });

        let joined = task.await;
        guard.disarm();

        match joined {
            Ok(result) => result.map_err(map_image_error),
            Err(e) => Err(ApplicationError::unhandled(IMAGE_FAILED, e)),
        }
    }
}

/// 从模型输出中取第一张图片
///
/// 输出必须是非空的字符串数组
fn first_image_url(output: &Value) -> Option<String> {
    let urls = output.as_array()?;
    if urls.iter().any(|url| !url.is_string()) {
        return None;
    }
    urls.first().and_then(Value::as_str).map(str::to_string)
}

fn map_image_error(err: ImageError) -> ApplicationError {
    match err {
        ImageError::Provider { status, body } => {
            tracing::error!(status = status, body = %body, "Replicate API error");
            ApplicationError::provider(IMAGE_FAILED, status, body)
        }
        // 被取消的预测没有输出
        ImageError::Canceled => ApplicationError::empty_result(NO_IMAGES),
        other => {
            tracing::error!(error = %other, "Image generation failed");
            ApplicationError::unhandled(IMAGE_FAILED, other)
        }
    }
}
