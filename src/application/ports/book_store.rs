//! Book Store Port - 书籍存储
//!
//! 定义书籍聚合的存储抽象，具体实现使用 Sled (JSON 值)

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Book, BookId, MediaPatch, Paragraph};

/// Book Store 错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Book not found: {0}")]
    NotFound(BookId),

    #[error("Paragraph index out of range: {index} (total {total})")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Book Store Port
///
/// 读-改-写必须对单本书原子：update_paragraph 在存储实现内部
/// 完成加载、打补丁、回写，避免并发覆盖
#[async_trait]
pub trait BookStorePort: Send + Sync {
    /// 持久化新书
    async fn create(&self, book: &Book) -> Result<(), StoreError>;

    /// 按 ID 读取
    async fn get(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    /// 对指定段落应用媒体补丁，返回更新后的段落快照
    ///
    /// 段落正文不可变，补丁只覆盖 image_prompt/image_url/audio_url
    async fn update_paragraph(
        &self,
        id: BookId,
        index: usize,
        patch: &MediaPatch,
    ) -> Result<Paragraph, StoreError>;

    /// 删除书籍记录（已落盘的媒体文件不受影响）
    async fn delete(&self, id: BookId) -> Result<(), StoreError>;
}
