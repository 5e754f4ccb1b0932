//! Application State
//!
//! 路由处理器共享的服务与端口集合

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BookStorePort, GenerationHistoryPort};
use crate::application::services::{
    ActiveBatches, AudioService, BatchCoordinator, BookIngestService, ImageService, PromptRefiner,
    StoryService,
};
use crate::infrastructure::adapters::extract::TextExtractor;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub store: Arc<dyn BookStorePort>,
    pub history: Arc<dyn GenerationHistoryPort>,

    // ========== Services ==========
    pub extractor: Arc<TextExtractor>,
    pub ingest: Arc<BookIngestService>,
    pub story: Arc<StoryService>,
    pub refiner: Arc<PromptRefiner>,
    pub images: Arc<ImageService>,
    pub audio: Arc<AudioService>,
    pub coordinator: Arc<BatchCoordinator>,
    pub active: Arc<ActiveBatches>,

    /// 旁白 WAV 的静态目录（ServeDir 根）
    pub audio_dir: PathBuf,
}
