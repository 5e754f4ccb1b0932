//! 应用层端口定义
//!
//! 六边形架构的出站接口，具体实现位于 infrastructure 层

mod book_store;
mod chat_model;
mod history;
mod image_model;
mod media_storage;
mod metrics;
mod narration;

pub use book_store::{BookStorePort, StoreError};
pub use chat_model::{ChatModelPort, ChatRequest, LlmError};
pub use history::{GenerationAttempt, GenerationHistoryPort, HistoryError, MediaType};
pub use image_model::{ImageModelError, ImageModelPort};
pub use media_storage::{MediaStoragePort, StorageError};
pub use metrics::{MetricsError, PromptMetric, PromptMetricsPort};
pub use narration::{NarrationError, NarrationPort};
