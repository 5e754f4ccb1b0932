//! History HTTP Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::ports::GenerationAttempt;
use crate::domain::BookId;
use crate::infrastructure::http::dto::{ApiResponse, HistoryRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 查询生成历史，可按段落过滤
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<ApiResponse<Vec<GenerationAttempt>>>, ApiError> {
    let book_id = BookId::from_uuid(req.book_id);

    let attempts = match req.index {
        Some(index) => state.history.list_for_paragraph(book_id, index).await,
        None => state.history.list(book_id).await,
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::success(attempts)))
}
