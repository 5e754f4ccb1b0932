//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/book/create       POST  提示词生成故事并建书
//! - /api/book/upload       POST  上传文档建书 (multipart)
//! - /api/book/get          POST  获取书籍详情
//! - /api/book/delete       POST  删除书籍
//! - /api/generate/batch    POST  批量生成，逐行 JSON 流式响应
//! - /api/generate/image    POST  单段插图重生成
//! - /api/generate/audio    POST  单段旁白重生成
//! - /api/history           POST  查询生成历史
//! - /static/audio/*        GET   旁白 WAV 静态文件

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(audio_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .nest_service("/static/audio", ServeDir::new(audio_dir))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/book", book_routes())
        .nest("/generate", generate_routes())
        .route("/history", post(handlers::get_history))
}

/// Book 路由
fn book_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_book))
        .route("/upload", post(handlers::upload_book))
        .route("/get", post(handlers::get_book))
        .route("/delete", post(handlers::delete_book))
}

/// Generate 路由
fn generate_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/batch", post(handlers::generate_batch))
        .route("/image", post(handlers::regenerate_image))
        .route("/audio", post(handlers::regenerate_audio))
}
