//! SQLite 持久化

mod database;
mod history_repo;
mod metrics_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use history_repo::SqliteGenerationHistory;
pub use metrics_repo::SqlitePromptMetrics;
