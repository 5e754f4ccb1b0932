//! Book Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookError, BookId, BookMetadata, BookSource, MediaPatch, Paragraph};

/// Book 聚合根
///
/// 不变量:
/// - paragraphs 只增不减，顺序固定：索引 N 永远指向创建时的第 N 段
/// - 段落正文创建后不可变，只有媒体槽位可被覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    source: BookSource,
    metadata: BookMetadata,
    paragraphs: Vec<Paragraph>,
    created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(source: BookSource, metadata: BookMetadata, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            id: BookId::new(),
            source,
            metadata,
            paragraphs,
            created_at: Utc::now(),
        }
    }

    /// 由纯文本段落列表创建
    pub fn from_texts<I, S>(
        source: BookSource,
        metadata: BookMetadata,
        texts: I,
    ) -> Result<Self, BookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paragraphs = texts
            .into_iter()
            .map(|t| Paragraph::new(t).map_err(|e| BookError::InvalidParagraph(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(source, metadata, paragraphs))
    }

    // Getters
    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn source(&self) -> BookSource {
        self.source
    }

    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn get_paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 校验 [start, start+count) 是否落在段落范围内
    pub fn check_range(&self, start: usize, count: usize) -> Result<(), BookError> {
        let end = start.checked_add(count).unwrap_or(usize::MAX);
        if end > self.paragraphs.len() {
            return Err(BookError::IndexOutOfRange {
                index: end.saturating_sub(1),
                total: self.paragraphs.len(),
            });
        }
        Ok(())
    }

    /// 对指定段落应用媒体补丁，返回更新后的快照
    pub fn patch_paragraph(
        &mut self,
        index: usize,
        patch: &MediaPatch,
    ) -> Result<Paragraph, BookError> {
        let total = self.paragraphs.len();
        let paragraph = self
            .paragraphs
            .get_mut(index)
            .ok_or(BookError::IndexOutOfRange { index, total })?;
        paragraph.apply(patch);
        Ok(paragraph.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_from_texts_preserves_order() {
        let book = sample_book();
        assert_eq!(book.paragraph_count(), 2);
        assert_eq!(book.paragraphs()[0].text(), "A fox woke at dawn.");
        assert_eq!(book.paragraphs()[1].text(), "It crossed the frozen river.");
    }

    #[test]
    fn test_check_range() {
        let book = sample_book();
        assert!(book.check_range(0, 2).is_ok());
        assert!(book.check_range(1, 1).is_ok());
        assert!(book.check_range(1, 2).is_err());
        // 起点本身已越界
        assert!(book.check_range(5, 3).is_err());
    }

    #[test]
    fn test_patch_paragraph_keeps_text_immutable() {
        let mut book = sample_book();
        let before = book.paragraphs()[0].text().to_string();

        let snapshot = book
            .patch_paragraph(0, &MediaPatch::audio("/static/audio/x.wav"))
            .unwrap();

        assert_eq!(snapshot.text(), before);
        assert_eq!(snapshot.audio_url.as_deref(), Some("/static/audio/x.wav"));
    }

    #[test]
    fn test_patch_out_of_range() {
        let mut book = sample_book();
        assert!(book.patch_paragraph(9, &MediaPatch::default()).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let book = sample_book();
        let json = serde_json::to_string(&book).unwrap();
        let back: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), book.id());
        assert_eq!(back.paragraph_count(), 2);
    }
}
