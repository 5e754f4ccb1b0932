//! Generation History Port - 生成历史
//!
//! 每次媒体生成的终局结果写一行，只增不改，具体实现使用 SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BookId;

/// History 错误
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }
}

/// 一次媒体生成的终局记录
///
/// 成功失败各写一行；重试在行内累计，不单独成行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub book_id: BookId,
    pub paragraph_index: u32,
    pub media_type: MediaType,
    /// 图像为精炼后的提示词，音频为 None
    pub prompt: Option<String>,
    pub url: Option<String>,
    pub success: bool,
    /// 成功前经历的失败次数；全部失败时为尝试上限
    pub retries: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationAttempt {
    pub fn succeeded(
        book_id: BookId,
        paragraph_index: u32,
        media_type: MediaType,
        prompt: Option<String>,
        url: Option<String>,
        retries: u32,
    ) -> Self {
        Self {
            book_id,
            paragraph_index,
            media_type,
            prompt,
            url,
            success: true,
            retries,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(
        book_id: BookId,
        paragraph_index: u32,
        media_type: MediaType,
        prompt: Option<String>,
        retries: u32,
        error: String,
    ) -> Self {
        Self {
            book_id,
            paragraph_index,
            media_type,
            prompt,
            url: None,
            success: false,
            retries,
            error: Some(error),
            created_at: Utc::now(),
        }
    }
}

/// Generation History Port
#[async_trait]
pub trait GenerationHistoryPort: Send + Sync {
    /// 追加一条记录（表只插入，不更新）
    async fn append(&self, attempt: GenerationAttempt) -> Result<(), HistoryError>;

    /// 按书籍列出全部记录，按写入顺序
    async fn list(&self, book_id: BookId) -> Result<Vec<GenerationAttempt>, HistoryError>;

    /// 按书籍 + 段落索引列出记录
    async fn list_for_paragraph(
        &self,
        book_id: BookId,
        paragraph_index: u32,
    ) -> Result<Vec<GenerationAttempt>, HistoryError>;
}
