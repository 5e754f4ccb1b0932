//! HTML 抽取 - scraper DOM 遍历
//!
//! 跳过 script/style/meta/link/nav/footer 子树，h1..h3 输出
//! `[Heading]` 标记行，其余块级元素输出纯文本段落。

use std::path::Path;

use scraper::{ElementRef, Html};

use super::{txt_doc, ExtractError};

/// 整个子树被丢弃的元素
const SKIPPED: &[&str] = &["script", "style", "meta", "link", "nav", "footer", "head"];

/// 输出为独立段落的块级元素
const BLOCKS: &[&str] = &["p", "li", "blockquote", "pre", "td"];

pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes =
        std::fs::read(path).map_err(|e| ExtractError::UnreadableSource(e.to_string()))?;
    let html = txt_doc::decode(&bytes);
    Ok(html_to_text(&html))
}

/// HTML → 带 `[Heading]` 标记的纯文本
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    walk(document.root_element(), &mut out);
    out.trim().to_string()
}

fn walk(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED.contains(&name) {
        return;
    }

    if matches!(name, "h1" | "h2" | "h3") {
        let text = collapse(element);
        if !text.is_empty() {
            out.push_str("[Heading] ");
            out.push_str(&text);
            out.push_str("\n\n");
        }
        return;
    }

    if BLOCKS.contains(&name) {
        let text = collapse(element);
        if !text.is_empty() {
            out.push_str(&text);
            out.push_str("\n\n");
        }
        return;
    }

    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            walk(child, out);
        }
    }
}

/// 元素全部文本折叠为单行
fn collapse(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 章节内容首个 h1/h2 的文本
pub(super) fn leading_heading(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = scraper::Selector::parse("h1, h2").expect("hard-coded selector");
    document
        .select(&selector)
        .next()
        .map(collapse)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_become_marker_lines() {
        let html = "<html><body><h1>The River</h1><p>The fox woke at dawn.</p></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "[Heading] The River\n\nThe fox woke at dawn.");
    }

    #[test]
    fn test_skips_script_style_and_nav() {
        let html = "<html><head><style>p{}</style></head><body>\
                    <nav><p>menu</p></nav>\
                    <p>Kept text.</p>\
                    <script>alert(1)</script>\
                    <footer><p>legal</p></footer></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "Kept text.");
    }

    #[test]
    fn test_collapses_inline_whitespace() {
        let html = "<p>The   fox\n  woke.</p>";
        assert_eq!(html_to_text(html), "The fox woke.");
    }

    #[test]
    fn test_leading_heading() {
        assert_eq!(
            leading_heading("<h2>Morning</h2><p>x</p>").as_deref(),
            Some("Morning")
        );
        assert_eq!(leading_heading("<p>no heading</p>"), None);
    }
}
