//! Sled Book Store - 书籍存储实现
//!
//! `book:{uuid}` → JSON 编码的 Book 聚合。
//! 读-改-写在实例内的互斥锁下执行，配合协调器的单写者
//! 约定保证同一本书的补丁不会互相覆盖。

use std::path::Path;

use async_trait::async_trait;
use sled::Db;
use tokio::sync::Mutex;

use crate::application::ports::{BookStorePort, StoreError};
use crate::domain::{Book, BookError, BookId, MediaPatch, Paragraph};

/// Sled 书籍存储
pub struct SledBookStore {
    db: Db,
    write_lock: Mutex<()>,
}

impl SledBookStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::info!(path = %path.as_ref().display(), "SledBookStore initialized");
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn key(id: BookId) -> String {
        format!("book:{id}")
    }

    fn load(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let Some(bytes) = self
            .db
            .get(Self::key(id))
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?
        else {
            return Ok(None);
        };
        let book = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Ok(Some(book))
    }

    fn persist(&self, book: &Book) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(book)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        self.db
            .insert(Self::key(book.id()), bytes)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BookStorePort for SledBookStore {
    async fn create(&self, book: &Book) -> Result<(), StoreError> {
        self.persist(book)?;
        tracing::debug!(book_id = %book.id(), paragraphs = book.paragraph_count(), "书籍已写入");
        Ok(())
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        self.load(id)
    }

    async fn update_paragraph(
        &self,
        id: BookId,
        index: usize,
        patch: &MediaPatch,
    ) -> Result<Paragraph, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut book = self.load(id)?.ok_or(StoreError::NotFound(id))?;
        let snapshot = book.patch_paragraph(index, patch).map_err(|e| match e {
            BookError::IndexOutOfRange { index, total } => {
                StoreError::IndexOutOfRange { index, total }
            }
            other => StoreError::DatabaseError(other.to_string()),
        })?;
        self.persist(&book)?;
        Ok(snapshot)
    }

    async fn delete(&self, id: BookId) -> Result<(), StoreError> {
        self.db
            .remove(Self::key(id))
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        tracing::debug!(book_id = %id, "书籍已删除");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::domain::{BookMetadata, BookSource};

    fn sample_book() -> Book {
        Book::from_texts(
            BookSource::Prompt,
            BookMetadata {
                title: "The Fox".to_string(),
                ..Default::default()
            },
            ["A fox woke at dawn.", "It crossed the frozen river."],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();
        let book = sample_book();

        store.create(&book).await.unwrap();
        let loaded = store.get(book.id()).await.unwrap().unwrap();

        assert_eq!(loaded.id(), book.id());
        assert_eq!(loaded.paragraph_count(), 2);
        assert_eq!(loaded.paragraphs()[0].text(), "A fox woke at dawn.");
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();
        assert!(store.get(BookId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_paragraph_persists_patch() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();
        let book = sample_book();
        store.create(&book).await.unwrap();

        let snapshot = store
            .update_paragraph(book.id(), 1, &MediaPatch::audio("/static/audio/x.wav"))
            .await
            .unwrap();
        assert_eq!(snapshot.audio_url.as_deref(), Some("/static/audio/x.wav"));

        let reloaded = store.get(book.id()).await.unwrap().unwrap();
        assert_eq!(
            reloaded.paragraphs()[1].audio_url.as_deref(),
            Some("/static/audio/x.wav")
        );
        // 相邻段落不受影响
        assert!(reloaded.paragraphs()[0].audio_url.is_none());
    }

    #[tokio::test]
    async fn test_update_out_of_range() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();
        let book = sample_book();
        store.create(&book).await.unwrap();

        let err = store
            .update_paragraph(book.id(), 9, &MediaPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_book() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();

        let err = store
            .update_paragraph(BookId::new(), 0, &MediaPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SledBookStore::open(dir.path()).unwrap();
        let book = sample_book();
        store.create(&book).await.unwrap();

        store.delete(book.id()).await.unwrap();
        assert!(store.get(book.id()).await.unwrap().is_none());
        // 再删一次不报错
        store.delete(book.id()).await.unwrap();
    }
}
