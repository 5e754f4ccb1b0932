//! EPUB 抽取 - 沿 spine 迭代文档项
//!
//! 每章 HTML 剥离为纯文本；章首存在 h1/h2 时前置 `[Chapter: T]` 标记。

use std::path::Path;

use epub::doc::EpubDoc;

use super::{html_doc, ExtractError};

pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let mut doc =
        EpubDoc::new(path).map_err(|e| ExtractError::UnreadableSource(e.to_string()))?;

    let mut out = preamble(
        doc.mdata("title").map(|m| m.value.clone()),
        doc.mdata("creator").map(|m| m.value.clone()),
    );

    loop {
        if let Some((content, _mime)) = doc.get_current_str() {
            if let Some(heading) = html_doc::leading_heading(&content) {
                out.push_str(&format!("[Chapter: {heading}]\n"));
            }
            let text = html_doc::html_to_text(&content);
            if !text.is_empty() {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        if !doc.go_next() {
            break;
        }
    }

    if out.trim().is_empty() {
        return Err(ExtractError::UnreadableSource(
            "epub contains no readable text".to_string(),
        ));
    }
    Ok(out)
}

/// 由 OPF 元数据值组装 `Title:` / `Author:` 前言行
fn preamble(title: Option<String>, author: Option<String>) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        out.push_str(&format!("Title: {title}\n"));
    }
    if let Some(author) = author {
        out.push_str(&format!("Author: {author}\n"));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_with_full_metadata() {
        let out = preamble(Some("The Fox".to_string()), Some("A. Writer".to_string()));
        assert_eq!(out, "Title: The Fox\nAuthor: A. Writer\n\n");
    }

    #[test]
    fn test_preamble_skips_missing_fields() {
        assert_eq!(preamble(Some("The Fox".to_string()), None), "Title: The Fox\n\n");
        assert_eq!(preamble(None, None), "\n");
    }
}
