//! Book HTTP Handlers
//!
//! 建书（提示词 / 上传文档）、查询与删除

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::application::services::StoryRequest;
use crate::domain::{Book, BookId, BookMetadata, BookSource};
use crate::infrastructure::adapters::extract::SourceFormat;
use crate::infrastructure::http::dto::{
    ApiResponse, BookResponse, CreateBookRequest, DeleteBookRequest, Empty, GetBookRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 书名兜底：取提示词开头
const TITLE_FROM_PROMPT_CHARS: usize = 60;

/// 提示词生成故事并建书
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt is required".to_string()));
    }

    let request = StoryRequest {
        prompt: req.prompt.clone(),
        genre: req.genre.clone(),
        mood: req.mood.clone(),
        target_audience: req.target_audience.clone(),
        paragraphs: req.paragraphs,
    };
    let paragraphs = state.story.generate(&request).await?;

    let metadata = BookMetadata {
        title: req.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| {
            req.prompt.chars().take(TITLE_FROM_PROMPT_CHARS).collect()
        }),
        author: None,
        genre: req.genre,
        mood: req.mood,
        target_audience: req.target_audience,
    };

    let book = Book::from_texts(BookSource::Prompt, metadata, paragraphs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state.store.create(&book).await?;

    tracing::info!(book_id = %book.id(), paragraphs = book.paragraph_count(), "Book created from prompt");
    Ok(Json(ApiResponse::success(BookResponse::from(&book))))
}

/// 上传文档建书 (multipart: file 必填, title 选填)
pub async fn upload_book(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let mut title: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read title: {}", e)))?,
                );
            }
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?;

    // 先验证扩展名，再落临时文件
    let source_path = PathBuf::from(&file_name);
    SourceFormat::from_extension(&source_path)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let extension = source_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_ascii_lowercase();

    let temp_path =
        std::env::temp_dir().join(format!("fabula_upload_{}.{}", Uuid::new_v4(), extension));
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {}", e)))?;

    // 文档解析是阻塞调用
    let extractor = state.extractor.clone();
    let extract_path = temp_path.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&extract_path))
        .await
        .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))?;

    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove staged upload");
    }

    let text = extracted.map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let fallback_title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            source_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

    let book = state.ingest.ingest(&fallback_title, &text)?;
    state.store.create(&book).await?;

    tracing::info!(
        book_id = %book.id(),
        file = %file_name,
        paragraphs = book.paragraph_count(),
        "Book created from upload"
    );
    Ok(Json(ApiResponse::success(BookResponse::from(&book))))
}

/// 获取书籍详情
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetBookRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let book_id = BookId::from_uuid(req.id);
    let book = state
        .store
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book not found: {book_id}")))?;

    Ok(Json(ApiResponse::success(BookResponse::from(&book))))
}

/// 删除书籍
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteBookRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let book_id = BookId::from_uuid(req.id);

    if state.active.is_running(book_id) {
        return Err(ApiError::Conflict(format!(
            "a batch is running for book {book_id}"
        )));
    }

    state
        .store
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book not found: {book_id}")))?;
    state.store.delete(book_id).await?;

    tracing::info!(book_id = %book_id, "Book deleted");
    Ok(Json(ApiResponse::ok()))
}
