//! Generation HTTP Handlers
//!
//! 批量生成（逐行 JSON 流式响应）与单段重生成

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::Response,
    Json,
};
use tokio::sync::mpsc;

use crate::application::services::{story_context, BatchRequest, ProgressEvent};
use crate::domain::{BookId, ImageStyle, MediaPatch};
use crate::infrastructure::http::dto::{
    ApiResponse, BatchGenerateRequest, RegenerateAudioRequest, RegenerateImageRequest,
    RegenerateResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 批量生成，响应体为逐行 JSON 事件流
///
/// 所有失败（包括书不存在）都以 `error` 事件的形式出现在流里
pub async fn generate_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchGenerateRequest>,
) -> Result<Response, ApiError> {
    let request = BatchRequest {
        book_id: BookId::from_uuid(req.book_id),
        start_index: req.start_index,
        count: req.count,
        style: req.style,
    };

    let (tx, rx) = mpsc::channel::<ProgressEvent>(32);
    let coordinator = state.coordinator.clone();
    tokio::spawn(async move {
        coordinator.run(request, tx).await;
    });

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let mut line = serde_json::to_string(&event)
            .unwrap_or_else(|e| format!(r#"{{"status":"error","message":"{e}"}}"#));
        line.push('\n');
        Some((Ok::<_, std::convert::Infallible>(line), rx))
    });

    Response::builder()
        .header(CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// 单段插图重生成
pub async fn regenerate_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateImageRequest>,
) -> Result<Json<ApiResponse<RegenerateResponse>>, ApiError> {
    let book_id = BookId::from_uuid(req.book_id);
    let book = state
        .store
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book not found: {book_id}")))?;

    let text = book
        .get_paragraph(req.index)
        .map(|p| p.text().to_string())
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "paragraph index {} out of range (total {})",
                req.index,
                book.paragraph_count()
            ))
        })?;

    let style = ImageStyle::parse(req.style.as_deref().unwrap_or_default());
    let context = story_context(&book);
    let prompt = state.refiner.refine(&context, &text).await;

    let image = state
        .images
        .generate(book_id, req.index as u32, &prompt, style)
        .await
        .map_err(|e| ApiError::from_media(e, req.is_retry))?;

    state
        .store
        .update_paragraph(
            book_id,
            req.index,
            &MediaPatch::image(image.url.clone(), image.prompt, style.as_str()),
        )
        .await?;

    tracing::info!(book_id = %book_id, index = req.index, retries = image.retries, "Image regenerated");
    Ok(Json(ApiResponse::success(RegenerateResponse {
        success: true,
        url: Some(image.url),
    })))
}

/// 单段旁白重生成
pub async fn regenerate_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateAudioRequest>,
) -> Result<Json<ApiResponse<RegenerateResponse>>, ApiError> {
    let book_id = BookId::from_uuid(req.book_id);
    let book = state
        .store
        .get(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book not found: {book_id}")))?;

    let text = book
        .get_paragraph(req.index)
        .map(|p| p.text().to_string())
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "paragraph index {} out of range (total {})",
                req.index,
                book.paragraph_count()
            ))
        })?;

    let url = state
        .audio
        .generate(book_id, req.index as u32, &text)
        .await
        .map_err(|e| ApiError::from_media(e, req.is_retry))?;

    if let Some(url) = &url {
        state
            .store
            .update_paragraph(book_id, req.index, &MediaPatch::audio(url.clone()))
            .await?;
    }

    tracing::info!(book_id = %book_id, index = req.index, has_url = url.is_some(), "Audio regenerated");
    Ok(Json(ApiResponse::success(RegenerateResponse {
        success: true,
        url,
    })))
}
