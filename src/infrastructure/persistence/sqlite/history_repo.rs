//! SQLite Generation History Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    GenerationAttempt, GenerationHistoryPort, HistoryError, MediaType,
};
use crate::domain::BookId;

/// SQLite 生成历史仓储
pub struct SqliteGenerationHistory {
    pool: DbPool,
}

impl SqliteGenerationHistory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttemptRow {
    book_id: String,
    paragraph_index: i64,
    media_type: String,
    prompt: Option<String>,
    url: Option<String>,
    success: i64,
    retries: i64,
    error: Option<String>,
    created_at: String,
}

impl TryFrom<AttemptRow> for GenerationAttempt {
    type Error = HistoryError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        Ok(GenerationAttempt {
            book_id: BookId::from_uuid(
                Uuid::parse_str(&row.book_id)
                    .map_err(|e| HistoryError::DatabaseError(e.to_string()))?,
            ),
            paragraph_index: row.paragraph_index as u32,
            media_type: MediaType::from_str(&row.media_type)
                .ok_or_else(|| {
                    HistoryError::DatabaseError(format!("unknown media type: {}", row.media_type))
                })?,
            prompt: row.prompt,
            url: row.url,
            success: row.success != 0,
            retries: row.retries as u32,
            error: row.error,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| HistoryError::DatabaseError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

const SELECT_COLUMNS: &str = "book_id, paragraph_index, media_type, prompt, url, \
                              success, retries, error, created_at";

#[async_trait]
impl GenerationHistoryPort for SqliteGenerationHistory {
    async fn append(&self, attempt: GenerationAttempt) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO generation_attempts
                (book_id, paragraph_index, media_type, prompt, url, success, retries, error, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt.book_id.to_string())
        .bind(attempt.paragraph_index as i64)
        .bind(attempt.media_type.as_str())
        .bind(&attempt.prompt)
        .bind(&attempt.url)
        .bind(attempt.success as i64)
        .bind(attempt.retries as i64)
        .bind(&attempt.error)
        .bind(attempt.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, book_id: BookId) -> Result<Vec<GenerationAttempt>, HistoryError> {
        let rows: Vec<AttemptRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM generation_attempts \
             WHERE book_id = ? ORDER BY attempt_seq"
        ))
        .bind(book_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(GenerationAttempt::try_from).collect()
    }

    async fn list_for_paragraph(
        &self,
        book_id: BookId,
        paragraph_index: u32,
    ) -> Result<Vec<GenerationAttempt>, HistoryError> {
        let rows: Vec<AttemptRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM generation_attempts \
             WHERE book_id = ? AND paragraph_index = ? ORDER BY attempt_seq"
        ))
        .bind(book_id.to_string())
        .bind(paragraph_index as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(GenerationAttempt::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteGenerationHistory {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteGenerationHistory::new(pool)
    }

    #[tokio::test]
    async fn test_append_and_list_preserves_order() {
        let repo = repo().await;
        let book_id = BookId::new();

        repo.append(GenerationAttempt::succeeded(
            book_id,
            0,
            MediaType::Image,
            Some("a fox".to_string()),
            Some("data:image/png;base64,AAAA".to_string()),
            1,
        ))
        .await
        .unwrap();
        repo.append(GenerationAttempt::failed(
            book_id,
            0,
            MediaType::Audio,
            None,
            3,
            "timeout".to_string(),
        ))
        .await
        .unwrap();

        let rows = repo.list(book_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        // 同段落内 image 行先于 audio 行
        assert_eq!(rows[0].media_type, MediaType::Image);
        assert!(rows[0].success);
        assert_eq!(rows[0].retries, 1);
        assert_eq!(rows[1].media_type, MediaType::Audio);
        assert!(!rows[1].success);
        assert_eq!(rows[1].error.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_list_for_paragraph_filters() {
        let repo = repo().await;
        let book_id = BookId::new();

        for index in [0u32, 1, 1] {
            repo.append(GenerationAttempt::succeeded(
                book_id,
                index,
                MediaType::Image,
                None,
                None,
                0,
            ))
            .await
            .unwrap();
        }

        let rows = repo.list_for_paragraph(book_id, 1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.paragraph_index == 1));
    }

    #[tokio::test]
    async fn test_list_scoped_to_book() {
        let repo = repo().await;
        let a = BookId::new();
        let b = BookId::new();

        repo.append(GenerationAttempt::succeeded(a, 0, MediaType::Image, None, None, 0))
            .await
            .unwrap();

        assert_eq!(repo.list(a).await.unwrap().len(), 1);
        assert!(repo.list(b).await.unwrap().is_empty());
    }
}
