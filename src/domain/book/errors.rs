//! Book Context - Errors

use thiserror::Error;

use super::BookId;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("书籍不存在: {0}")]
    NotFound(BookId),

    #[error("段落索引越界: {index} (共 {total} 段)")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("无效的段落内容: {0}")]
    InvalidParagraph(String),

    #[error("无效的元数据: {0}")]
    InvalidMetadata(String),
}
