//! Image Model Port - 图像生成模型抽象
//!
//! 具体实现在 infrastructure/adapters/image

use async_trait::async_trait;
use thiserror::Error;

/// 图像模型错误
#[derive(Debug, Error)]
pub enum ImageModelError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Image Model Port
#[async_trait]
pub trait ImageModelPort: Send + Sync {
    /// 按提示词生成一张图，返回原始 base64 编码的 PNG
    async fn generate(&self, prompt: &str) -> Result<String, ImageModelError>;
}
