//! Text Extractor - 上传文档文本抽取
//!
//! 按扩展名分派到具体解析器，输出带结构标记的纯文本：
//! `[Page N]`（PDF 页间）、`[Chapter: T]`（EPUB 章首）、
//! `[Heading] …`（HTML h1..h3），前导可携带 `Title:` / `Author:` 行。
//! 解析全部为阻塞调用，HTTP 层经 spawn_blocking 进入。

mod epub_doc;
mod html_doc;
mod pdf_doc;
mod txt_doc;

use std::path::Path;

use thiserror::Error;

/// 抽取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unreadable source: {0}")]
    UnreadableSource(String),
}

/// 支持的文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Epub,
    Html,
    Txt,
}

impl SourceFormat {
    /// 由文件扩展名推断格式
    pub fn from_extension(path: &Path) -> Result<Self, ExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "epub" => Ok(Self::Epub),
            "html" | "htm" => Ok(Self::Html),
            "txt" => Ok(Self::Txt),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 文本抽取器
#[derive(Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 抽取文档为带结构标记的纯文本
    pub fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let format = SourceFormat::from_extension(path)?;
        tracing::debug!(path = %path.display(), format = ?format, "开始抽取文档");
        match format {
            SourceFormat::Pdf => pdf_doc::extract(path),
            SourceFormat::Epub => epub_doc::extract(path),
            SourceFormat::Html => html_doc::extract(path),
            SourceFormat::Txt => txt_doc::extract(path),
        }
    }
}
