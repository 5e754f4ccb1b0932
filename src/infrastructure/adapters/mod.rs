//! 外部服务与文件系统适配器

pub mod extract;
pub mod image;
pub mod llm;
pub mod narration;
pub mod storage;
