//! 上传文档入库
//!
//! 抽取器产出的文本带结构标记（`[Chapter: T]`、`[Page N]`、
//! `[Heading] …`、行首 `Title:` / `Author:` 前导），这里解析并剥离
//! 标记、按章节清洗分块，组装成 Book 聚合。

use tracing::info;

use crate::application::error::ApplicationError;
use crate::domain::{
    chunk_text, Book, BookMetadata, BookSource, ChunkConfig, Paragraph, TextCleaner,
};

/// 上传入库服务
pub struct BookIngestService {
    cleaner: TextCleaner,
    chunking: ChunkConfig,
}

/// 解析出的章节片段
struct Section {
    number: Option<u32>,
    title: Option<String>,
    body: String,
}

impl BookIngestService {
    pub fn new(chunking: ChunkConfig) -> Self {
        Self {
            cleaner: TextCleaner::new(),
            chunking,
        }
    }

    /// 从抽取文本构建书籍
    ///
    /// `fallback_title` 在文档前导缺少 `Title:` 行时使用
    pub fn ingest(&self, fallback_title: &str, text: &str) -> Result<Book, ApplicationError> {
        let (metadata, body) = parse_preamble(fallback_title, text);
        let sections = parse_sections(&body);

        let mut paragraphs = Vec::new();
        for section in &sections {
            let cleaned = self.cleaner.clean(&section.body);
            for chunk in chunk_text(&cleaned, &self.chunking) {
                let paragraph = Paragraph::new(chunk)
                    .map_err(|e| ApplicationError::validation(e.to_string()))?;
                let paragraph = match section.number {
                    Some(number) => paragraph.with_chapter(number, section.title.clone()),
                    None => paragraph,
                };
                paragraphs.push(paragraph);
            }
        }

        if paragraphs.is_empty() {
            return Err(ApplicationError::validation(
                "document yielded no usable paragraphs",
            ));
        }

        let book = Book::new(BookSource::Upload, metadata, paragraphs);
        info!(book_id = %book.id(), paragraphs = book.paragraph_count(), "上传文档入库完成");
        Ok(book)
    }
}

/// 读取前导的 `Title:` / `Author:` 行，返回元数据与剩余正文
fn parse_preamble(fallback_title: &str, text: &str) -> (BookMetadata, String) {
    let mut title = None;
    let mut author = None;
    let mut consumed = 0;

    for line in text.lines() {
        let trimmed = line.trim();
        if title.is_none() {
            if let Some(value) = trimmed.strip_prefix("Title:") {
                title = Some(value.trim().to_string());
                consumed += line.len() + 1;
                continue;
            }
        }
        if author.is_none() {
            if let Some(value) = trimmed.strip_prefix("Author:") {
                author = Some(value.trim().to_string());
                consumed += line.len() + 1;
                continue;
            }
        }
        if trimmed.is_empty() && (title.is_some() || author.is_some()) {
            consumed += line.len() + 1;
            continue;
        }
        break;
    }

    let metadata = BookMetadata {
        title: title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_title.to_string()),
        author: author.filter(|a| !a.is_empty()),
        ..Default::default()
    };
    (metadata, text[consumed.min(text.len())..].to_string())
}

/// 按结构标记行切分章节
///
/// `[Chapter: T]` 与 `[Heading] …` 开启新章节并递增编号，
/// `[Page N]` 仅被剥离
fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        number: None,
        title: None,
        body: String::new(),
    };
    let mut chapter_counter = 0u32;

    let mut push_current = |sections: &mut Vec<Section>, current: &mut Section| {
        if !current.body.trim().is_empty() {
            sections.push(std::mem::replace(
                current,
                Section {
                    number: None,
                    title: None,
                    body: String::new(),
                },
            ));
        }
    };

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(title) = parse_chapter_marker(trimmed) {
            push_current(&mut sections, &mut current);
            chapter_counter += 1;
            current = Section {
                number: Some(chapter_counter),
                title,
                body: String::new(),
            };
            continue;
        }
        if is_page_marker(trimmed) {
            continue;
        }

        current.body.push_str(line);
        current.body.push('\n');
    }
    push_current(&mut sections, &mut current);

    sections
}

/// `[Chapter: T]` 或 `[Heading] T` → 章节标题（可为空）
fn parse_chapter_marker(line: &str) -> Option<Option<String>> {
    if let Some(rest) = line.strip_prefix("[Chapter:") {
        let title = rest.strip_suffix(']')?.trim();
        return Some((!title.is_empty()).then(|| title.to_string()));
    }
    if let Some(rest) = line.strip_prefix("[Heading]") {
        let title = rest.trim();
        return Some((!title.is_empty()).then(|| title.to_string()));
    }
    None
}

fn is_page_marker(line: &str) -> bool {
    line.strip_prefix("[Page ")
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> BookIngestService {
        BookIngestService::new(ChunkConfig::default())
    }

    #[test]
    fn test_ingest_assigns_chapters_and_strips_markers() {
        let text = "[Chapter: The River]\nThe fox woke at dawn. It crossed the frozen river.\n\
                    [Page 2]\n[Chapter: The Hills]\nSnow fell without a sound over the hills.";
        let book = service().ingest("Winter Tale", text).unwrap();

        assert_eq!(book.metadata().title, "Winter Tale");
        assert_eq!(book.source(), BookSource::Upload);
        assert_eq!(book.paragraph_count(), 2);

        let first = &book.paragraphs()[0];
        assert_eq!(first.chapter_number, Some(1));
        assert_eq!(first.chapter_title.as_deref(), Some("The River"));
        assert!(!first.text().contains('['));

        let second = &book.paragraphs()[1];
        assert_eq!(second.chapter_number, Some(2));
        assert_eq!(second.chapter_title.as_deref(), Some("The Hills"));
    }

    #[test]
    fn test_ingest_reads_title_preamble() {
        let text = "Title: The Fox\nAuthor: A. Winter\n\nThe fox woke at dawn. It crossed the river.";
        let book = service().ingest("fallback", text).unwrap();

        assert_eq!(book.metadata().title, "The Fox");
        assert_eq!(book.metadata().author.as_deref(), Some("A. Winter"));
    }

    #[test]
    fn test_heading_markers_open_sections() {
        let text = "[Heading] Morning\nThe fox woke at dawn. It stretched slowly in the cold.";
        let book = service().ingest("t", text).unwrap();

        assert_eq!(book.paragraphs()[0].chapter_number, Some(1));
        assert_eq!(book.paragraphs()[0].chapter_title.as_deref(), Some("Morning"));
    }

    #[test]
    fn test_unusable_document_is_rejected() {
        let err = service().ingest("t", "[Page 1]\nshort junk\n").unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
