//! 用例服务
//!
//! 围绕端口组合出的生成流水线各环节

mod audio;
mod batch;
mod image;
mod ingest;
mod prompt_refiner;
mod story;

pub use audio::AudioService;
pub use batch::{story_context, ActiveBatches, BatchCoordinator, BatchRequest, ProgressEvent};
pub use image::{GeneratedImage, ImageService};
pub use ingest::BookIngestService;
pub use prompt_refiner::PromptRefiner;
pub use story::{StoryRequest, StoryService};

use thiserror::Error;

/// 媒体生成错误
#[derive(Debug, Error)]
pub enum MediaError {
    /// 重试耗尽后的上游失败，携带累计重试次数
    #[error("Upstream failure after {retries} retries: {message}")]
    Upstream { retries: u32, message: String },

    /// 会话返回了无法装箱的音频数据
    #[error("Malformed audio session: {0}")]
    MalformedAudio(String),

    /// 媒体文件落盘失败
    #[error("Storage failure: {0}")]
    Storage(String),
}
