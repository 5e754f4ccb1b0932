//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Book, BookSource, Paragraph};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Book DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub prompt: String,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub target_audience: Option<String>,
    #[serde(default = "default_paragraphs")]
    pub paragraphs: usize,
}

fn default_paragraphs() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct GetBookRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBookRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub source: BookSource,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub total_paragraphs: usize,
    pub paragraphs: Vec<Paragraph>,
    pub created_at: String,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        let metadata = book.metadata();
        Self {
            id: *book.id().as_uuid(),
            source: book.source(),
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            genre: metadata.genre.clone(),
            mood: metadata.mood.clone(),
            target_audience: metadata.target_audience.clone(),
            total_paragraphs: book.paragraph_count(),
            paragraphs: book.paragraphs().to_vec(),
            created_at: book.created_at().to_rfc3339(),
        }
    }
}

// ============================================================================
// Generation DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BatchGenerateRequest {
    pub book_id: Uuid,
    #[serde(default)]
    pub start_index: usize,
    pub count: usize,
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateImageRequest {
    pub book_id: Uuid,
    pub index: usize,
    pub style: Option<String>,
    #[serde(default)]
    pub is_retry: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateAudioRequest {
    pub book_id: Uuid,
    pub index: usize,
    #[serde(default)]
    pub is_retry: bool,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub success: bool,
    pub url: Option<String>,
}

// ============================================================================
// History DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub book_id: Uuid,
    /// 给定时只看该段落的记录
    pub index: Option<u32>,
}
