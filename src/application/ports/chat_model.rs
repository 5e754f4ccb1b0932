//! Chat Model Port - 文本生成模型抽象
//!
//! 故事正文与提示词精炼共用的 LLM 接口，具体实现在 infrastructure/adapters/llm

use async_trait::async_trait;
use thiserror::Error;

/// LLM 错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 一次补全请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// 系统提示
    pub system: String,
    /// 用户消息
    pub user: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Chat Model Port
#[async_trait]
pub trait ChatModelPort: Send + Sync {
    /// 单轮补全，返回模型输出文本
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}
