//! Prompt Metrics Port - 提示词精炼指标
//!
//! 每次精炼调用（成功或失败）记录一行，具体实现使用 SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metrics 错误
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 一次提示词精炼的指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetric {
    /// 精炼类型（refine / fallback）
    pub prompt_type: String,
    pub generation_time_ms: u64,
    pub num_refinement_steps: u32,
    pub success: bool,
    /// 最终提示词长度（字符数）
    pub prompt_length: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Prompt Metrics Port
#[async_trait]
pub trait PromptMetricsPort: Send + Sync {
    async fn record(&self, metric: PromptMetric) -> Result<(), MetricsError>;
}
