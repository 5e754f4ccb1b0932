//! SQLite Prompt Metrics Repository

use async_trait::async_trait;

use super::DbPool;
use crate::application::ports::{MetricsError, PromptMetric, PromptMetricsPort};

/// SQLite 提示词指标仓储
pub struct SqlitePromptMetrics {
    pool: DbPool,
}

impl SqlitePromptMetrics {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptMetricsPort for SqlitePromptMetrics {
    async fn record(&self, metric: PromptMetric) -> Result<(), MetricsError> {
        sqlx::query(
            r#"
            INSERT INTO prompt_metrics
                (prompt_type, generation_time_ms, num_refinement_steps, success, prompt_length, error, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&metric.prompt_type)
        .bind(metric.generation_time_ms as i64)
        .bind(metric.num_refinement_steps as i64)
        .bind(metric.success as i64)
        .bind(metric.prompt_length as i64)
        .bind(&metric.error)
        .bind(metric.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| MetricsError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    #[tokio::test]
    async fn test_record_inserts_row() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqlitePromptMetrics::new(pool.clone());

        repo.record(PromptMetric {
            prompt_type: "refine".to_string(),
            generation_time_ms: 120,
            num_refinement_steps: 2,
            success: true,
            prompt_length: 48,
            error: None,
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

        let row = sqlx::query("SELECT prompt_type, success FROM prompt_metrics")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("prompt_type"), "refine");
        assert_eq!(row.get::<i64, _>("success"), 1);
    }
}
