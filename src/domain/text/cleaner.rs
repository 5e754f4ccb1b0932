//! 文本清洗器
//!
//! 上传文档在分句之前的归一化与样板移除：
//! - 去除 UTF-8 BOM、统一换行符
//! - 行内空白折叠、3+ 连续空行折叠为 2
//! - 移除 Project Gutenberg 头尾、目录块、章节类标题行、
//!   introduction/preface/foreword/appendix 小节

use regex::Regex;

/// 目录块中被视为条目的最大行宽，超过即认定正文恢复
const TOC_ENTRY_MAX_CHARS: usize = 60;

/// 文本清洗器
///
/// 正则在构造时编译一次，实例可复用
pub struct TextCleaner {
    spaces: Regex,
    blank_runs: Regex,
    heading_line: Regex,
    section_header: Regex,
    toc_header: Regex,
    gutenberg_start: Regex,
    gutenberg_end: Regex,
}

enum Skip {
    /// 目录块：跳过短条目行，首个条目之后的空行或任意长行即恢复正文
    Toc { seen_entry: bool },
    /// 小节块：跳过标题及其紧随的文本块
    Section { seen_content: bool },
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            spaces: Regex::new(r"[ \t]+").expect("hard-coded regex"),
            blank_runs: Regex::new(r"\n{3,}").expect("hard-coded regex"),
            heading_line: Regex::new(r"(?i)^(chapter|section|part|volume)\s+[\w'.:\- ]{1,60}$")
                .expect("hard-coded regex"),
            section_header: Regex::new(r"(?i)^(introduction|preface|foreword|appendix)\s*$")
                .expect("hard-coded regex"),
            toc_header: Regex::new(r"(?i)^(table\s+of\s+)?contents\s*$").expect("hard-coded regex"),
            gutenberg_start: Regex::new(
                r"(?i)\*\*\*\s*START OF (THE|THIS) PROJECT GUTENBERG EBOOK",
            )
            .expect("hard-coded regex"),
            gutenberg_end: Regex::new(r"(?i)\*\*\*\s*END OF (THE|THIS) PROJECT GUTENBERG EBOOK")
                .expect("hard-coded regex"),
        }
    }

    /// 清洗文本
    pub fn clean(&self, input: &str) -> String {
        let text = input.strip_prefix('\u{feff}').unwrap_or(input);
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = self.strip_gutenberg(&text);

        let mut kept: Vec<String> = Vec::new();
        let mut skip: Option<Skip> = None;

        for raw_line in text.lines() {
            let line = self.spaces.replace_all(raw_line.trim(), " ").to_string();

            match &mut skip {
                Some(Skip::Toc { seen_entry }) => {
                    if line.is_empty() {
                        if *seen_entry {
                            skip = None;
                        }
                        continue;
                    }
                    if line.chars().count() < TOC_ENTRY_MAX_CHARS {
                        *seen_entry = true;
                        continue;
                    }
                    skip = None;
                }
                Some(Skip::Section { seen_content }) => {
                    if line.is_empty() {
                        if *seen_content {
                            skip = None;
                        }
                        continue;
                    }
                    *seen_content = true;
                    continue;
                }
                None => {}
            }

            if self.toc_header.is_match(&line) {
                skip = Some(Skip::Toc { seen_entry: false });
                continue;
            }
            if self.section_header.is_match(&line) {
                skip = Some(Skip::Section { seen_content: false });
                continue;
            }
            if self.heading_line.is_match(&line) {
                continue;
            }

            kept.push(line);
        }

        let joined = kept.join("\n");
        self.blank_runs
            .replace_all(&joined, "\n\n")
            .trim()
            .to_string()
    }

    /// 去除 Gutenberg 头尾标记之外的样板
    fn strip_gutenberg(&self, text: &str) -> String {
        let mut body = text;
        if let Some(m) = self.gutenberg_start.find(body) {
            // 丢弃标记行及其之前的全部内容
            body = match body[m.end()..].find('\n') {
                Some(nl) => &body[m.end() + nl + 1..],
                None => "",
            };
        }
        if let Some(m) = self.gutenberg_end.find(body) {
            body = &body[..m.start()];
        }
        body.to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bom_and_normalizes_line_endings() {
        let cleaner = TextCleaner::new();
        let out = cleaner.clean("\u{feff}First line.\r\nSecond line.\r");
        assert_eq!(out, "First line.\nSecond line.");
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        let cleaner = TextCleaner::new();
        let out = cleaner.clean("A  sentence   with\t\ttabs.");
        assert_eq!(out, "A sentence with tabs.");
    }

    #[test]
    fn test_collapses_blank_lines_to_two() {
        let cleaner = TextCleaner::new();
        let out = cleaner.clean("One.\n\n\n\n\nTwo.");
        assert_eq!(out, "One.\n\nTwo.");
    }

    #[test]
    fn test_drops_chapter_headers() {
        let cleaner = TextCleaner::new();
        let out = cleaner.clean("Chapter 1: The Beginning\nThe fox woke at dawn.");
        assert_eq!(out, "The fox woke at dawn.");
    }

    #[test]
    fn test_drops_gutenberg_frame() {
        let cleaner = TextCleaner::new();
        let input = "junk header\n*** START OF THE PROJECT GUTENBERG EBOOK FOO ***\nThe story itself.\n*** END OF THE PROJECT GUTENBERG EBOOK FOO ***\nlicense text";
        assert_eq!(cleaner.clean(input), "The story itself.");
    }

    #[test]
    fn test_drops_toc_block() {
        let cleaner = TextCleaner::new();
        let input = "Table of Contents\nChapter 1 ... 3\nChapter 2 ... 9\n\nThe actual story begins here with a properly long opening sentence.";
        let out = cleaner.clean(input);
        assert_eq!(
            out,
            "The actual story begins here with a properly long opening sentence."
        );
    }

    #[test]
    fn test_toc_skip_ends_at_first_blank_line() {
        let cleaner = TextCleaner::new();
        // 正文全是短段落也不能被目录块吞掉
        let input = "Contents\nChapter 1 ... 3\nChapter 2 ... 9\n\nA short opening line.\nAnother short line.";
        let out = cleaner.clean(input);
        assert_eq!(out, "A short opening line.\nAnother short line.");
    }

    #[test]
    fn test_drops_preface_block() {
        let cleaner = TextCleaner::new();
        let input = "Preface\nSome words about the book.\nMore words.\n\nThe story proper.";
        assert_eq!(cleaner.clean(input), "The story proper.");
    }
}
