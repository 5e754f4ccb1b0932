//! LLM 输出标记过滤
//!
//! 模型生成的段落偶尔带有编号残留（`Segment 3:`、`[4]`、`(2)`、
//! 裸数字、`1.` / `2)` 列表符）。先做常规剥离；若结果仍命中标记，
//! 退回只保留 ASCII 的严格二次清洗；仍命中则判定段落不可用。

use regex::Regex;

fn marker_pattern() -> Regex {
    Regex::new(r"(?i)^\s*(segment\s+\d+\s*[:.\-]?|\[\d+\]|\(\d+\)|\d+\s*[.):\-]|\d+\b)\s*")
        .expect("hard-coded regex")
}

/// 剥离段落开头的编号标记
///
/// 返回 `None` 表示段落在两轮清洗后仍带标记或已为空，应当丢弃
pub fn strip_story_markers(text: &str) -> Option<String> {
    let pattern = marker_pattern();

    let cleaned = strip_once(&pattern, text);
    // 非 ASCII 字符可能把残留标记挡在模式之外，用 ASCII 投影检测
    let probe: String = cleaned.chars().filter(|c| c.is_ascii()).collect();
    if !cleaned.is_empty() && !pattern.is_match(probe.trim_start()) {
        return Some(cleaned);
    }

    // 严格模式：剔除非 ASCII 字符后重试
    let cleaned = strip_once(&pattern, &probe);
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned)
}

fn strip_once(pattern: &Regex, text: &str) -> String {
    let mut current = text.trim().to_string();
    // 标记可能叠加（"1. [2] Text"），循环剥离直到稳定
    loop {
        let next = pattern.replace(&current, "").trim_start().to_string();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_segment_label() {
        assert_eq!(
            strip_story_markers("Segment 3: The fox woke at dawn.").as_deref(),
            Some("The fox woke at dawn.")
        );
    }

    #[test]
    fn test_strips_bracketed_and_paren_numbers() {
        assert_eq!(
            strip_story_markers("[4] The river froze over.").as_deref(),
            Some("The river froze over.")
        );
        assert_eq!(
            strip_story_markers("(2) The wind was sharp.").as_deref(),
            Some("The wind was sharp.")
        );
    }

    #[test]
    fn test_strips_numeric_bullets() {
        assert_eq!(
            strip_story_markers("1. Snow fell without a sound.").as_deref(),
            Some("Snow fell without a sound.")
        );
        assert_eq!(
            strip_story_markers("2) Morning light returned.").as_deref(),
            Some("Morning light returned.")
        );
    }

    #[test]
    fn test_strips_stacked_markers() {
        assert_eq!(
            strip_story_markers("Segment 1: [1] The fox woke.").as_deref(),
            Some("The fox woke.")
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(
            strip_story_markers("The fox woke at dawn.").as_deref(),
            Some("The fox woke at dawn.")
        );
    }

    #[test]
    fn test_rejects_pure_marker() {
        assert_eq!(strip_story_markers("Segment 5:"), None);
        assert_eq!(strip_story_markers("   "), None);
    }

    #[test]
    fn test_ascii_fallback() {
        // 非 ASCII 符号把编号挡在常规模式之外，严格模式救回
        let input = "№3. The fox woke at dawn.";
        assert_eq!(
            strip_story_markers(input).as_deref(),
            Some("The fox woke at dawn.")
        );
    }
}
