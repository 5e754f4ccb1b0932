//! PDF 抽取 - pdf-extract 逐页取文本
//!
//! 页间插入 `[Page N]` 标记，前导用文件名兜底 `Title:` 行。

use std::path::Path;

use super::ExtractError;

pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| ExtractError::UnreadableSource(e.to_string()))?;

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");

    let mut out = format!("Title: {title}\n\n");
    for (number, page) in pages.iter().enumerate() {
        if number > 0 {
            out.push_str(&format!("\n[Page {}]\n", number + 1));
        }
        out.push_str(page.trim());
        out.push('\n');
    }
    Ok(out)
}
