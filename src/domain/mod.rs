//! Domain Layer
//!
//! - Book Context: 故事书聚合（段落列表与媒体槽位）
//! - Text: 纯文本处理（清洗、分句、分块、旁白切片、标记过滤）

pub mod book;
pub mod text;

pub use book::{
    Book, BookError, BookId, BookMetadata, BookSource, ImageStyle, MediaPatch, Paragraph,
};
pub use text::{
    chunk_text, narration_chunks, split_sentences, strip_story_markers, validate_sentence,
    ChunkConfig, TextCleaner, MAX_NARRATION_CHARS,
};
