//! Image Commands - 图片生成命令

use crate::domain::ImageRequestBody;

/// 生成图片命令
#[derive(Debug, Default)]
pub struct GenerateImageCommand {
    pub body: ImageRequestBody,
}

/// 生成图片响应
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateImageResponse {
    /// 第一张图片的 URL
    pub image_url: String,
    /// 原始提示词
    pub prompt: String,
}
