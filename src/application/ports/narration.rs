//! Narration Port - 叙述语音服务抽象
//!
//! 每次调用对应一条完整的 WebSocket 会话，具体实现在
//! infrastructure/adapters/narration

use async_trait::async_trait;
use thiserror::Error;

/// 叙述服务错误
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Session timeout")]
    Timeout,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Audio decode error: {0}")]
    DecodeError(String),
}

/// Narration Port
///
/// 约定返回 16-bit / 24 kHz / 单声道的裸 PCM
#[async_trait]
pub trait NarrationPort: Send + Sync {
    /// 朗读一段不超过消息上限的文本
    async fn narrate(&self, text: &str) -> Result<Vec<u8>, NarrationError>;
}
