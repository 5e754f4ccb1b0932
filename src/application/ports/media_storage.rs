//! Media Storage Port - 媒体文件落盘
//!
//! 具体实现在 infrastructure/adapters/storage

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// Media Storage Port
#[async_trait]
pub trait MediaStoragePort: Send + Sync {
    /// 保存一段 WAV 音频，返回可被静态路由命中的 URL 路径
    async fn save_audio(&self, bytes: &[u8]) -> Result<String, StorageError>;
}
