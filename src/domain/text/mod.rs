//! 文本处理
//!
//! 生成流水线的纯文本阶段：清洗、分句、分块、旁白切片、LLM 标记过滤。
//! 全部为无 IO 的纯函数 / 纯结构，便于单元测试。

mod chunker;
mod cleaner;
mod markers;
mod narration;

pub use chunker::{chunk_text, split_sentences, validate_sentence, ChunkConfig};
pub use cleaner::TextCleaner;
pub use markers::strip_story_markers;
pub use narration::{narration_chunks, MAX_NARRATION_CHARS};
