//! 句子切分与分块
//!
//! 清洗后的文本先按句末标点切分为句子（保护常见缩写），
//! 过滤无效句子后按固定大小 K 分组为段落块。

/// 句末缩写白名单（比较时小写、去句点）
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "no",
    "vol", "inc", "ltd", "co", "approx",
];

/// 分块配置
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 每块包含的句子数
    pub group_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { group_size: 2 }
    }
}

/// 按句末标点切分句子
///
/// 切分条件：`.` `!` `?` 之后（引号/括号可紧随其后）出现空白或文本结束；
/// `.` 额外要求前一个词不是缩写。小写开头的后续片段照常切出，
/// 交由 `validate_sentence` 拒绝，避免垃圾文本混入合法句子。
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);

        if matches!(ch, '.' | '!' | '?') {
            // 吸收紧随句末的闭合引号 / 括号
            let mut j = i + 1;
            while j < chars.len()
                && matches!(chars[j], '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
            {
                current.push(chars[j]);
                j += 1;
            }

            let boundary = if ch == '.' {
                !ends_with_abbreviation(&current) && followed_by_break(&chars, j)
            } else {
                followed_by_break(&chars, j)
            };

            if boundary {
                let sentence = current.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                current.clear();
            }
            i = j;
            continue;
        }

        i += 1;
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// 句末标点后紧跟空白（或到达文本末尾）才视为句界，保护 "3.5"、"U.S.A" 一类内嵌句点
fn followed_by_break(chars: &[char], k: usize) -> bool {
    k >= chars.len() || chars[k].is_whitespace()
}

fn ends_with_abbreviation(current: &str) -> bool {
    let trimmed = current
        .trim_end()
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}'));
    let Some(without_dot) = trimmed.strip_suffix('.') else {
        return false;
    };
    let token: String = without_dot
        .chars()
        .rev()
        .take_while(|c| !c.is_whitespace())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.is_empty() {
        return false;
    }
    // 单个大写字母视为人名缩写（"J. Smith"）
    if token.chars().count() == 1 && token.chars().next().is_some_and(|c| c.is_uppercase()) {
        return true;
    }
    ABBREVIATIONS.contains(&token.to_lowercase().as_str())
}

/// 校验句子是否可进入分块
///
/// 规则：首字符（允许前置引号/括号）大写、以 `.!?` 结尾、
/// 3–50 个词、长度 ≥ 10、引号与括号配平
pub fn validate_sentence(sentence: &str) -> bool {
    let trimmed = sentence.trim();
    if trimmed.chars().count() < 10 {
        return false;
    }

    let mut chars = trimmed
        .chars()
        .skip_while(|c| matches!(c, '"' | '\'' | '(' | '[' | '\u{201C}' | '\u{2018}'));
    match chars.next() {
        Some(first) if first.is_uppercase() => {}
        _ => return false,
    }

    let core = trimmed
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}'));
    if !core.ends_with(['.', '!', '?']) {
        return false;
    }

    let words = trimmed.split_whitespace().count();
    if !(3..=50).contains(&words) {
        return false;
    }

    is_balanced(trimmed)
}

fn is_balanced(s: &str) -> bool {
    let mut straight_quotes = 0usize;
    let mut curly = 0isize;
    let mut parens = 0isize;
    let mut brackets = 0isize;
    for c in s.chars() {
        match c {
            '"' => straight_quotes += 1,
            '\u{201C}' => curly += 1,
            '\u{201D}' => curly -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
        if parens < 0 || brackets < 0 {
            return false;
        }
    }
    straight_quotes % 2 == 0 && curly == 0 && parens == 0 && brackets == 0
}

/// 将清洗后的文本切分为句子块
///
/// 只有通过校验的连续句子参与分组；末尾不足 K 句的组保留
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    let k = config.group_size.max(1);
    let valid: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| validate_sentence(s))
        .collect();

    valid.chunks(k).map(|group| group.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic_sentences() {
        let sentences = split_sentences("The fox woke at dawn. It crossed the river! Was it cold?");
        assert_eq!(
            sentences,
            vec![
                "The fox woke at dawn.",
                "It crossed the river!",
                "Was it cold?"
            ]
        );
    }

    #[test]
    fn test_split_protects_abbreviations() {
        let sentences = split_sentences("Dr. Smith arrived at noon. He was late.");
        assert_eq!(
            sentences,
            vec!["Dr. Smith arrived at noon.", "He was late."]
        );

        let sentences = split_sentences("Use tools, e.g. Hammers are fine.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_split_does_not_merge_lowercase_continuation() {
        let sentences = split_sentences("The fox woke at dawn. lowercase junk here.");
        assert_eq!(
            sentences,
            vec!["The fox woke at dawn.", "lowercase junk here."]
        );
    }

    #[test]
    fn test_split_keeps_closing_quotes() {
        let sentences = split_sentences("\"Run!\" She ran away quickly.");
        assert_eq!(sentences[0], "\"Run!\"");
    }

    #[test]
    fn test_validate_sentence_rules() {
        assert!(validate_sentence("The fox crossed the river."));
        // 非大写开头
        assert!(!validate_sentence("the fox crossed the river."));
        // 无句末标点
        assert!(!validate_sentence("The fox crossed the river"));
        // 少于 3 个词
        assert!(!validate_sentence("Morning came."));
        // 引号不配平
        assert!(!validate_sentence("The fox said \"wait for me."));
        // 过短
        assert!(!validate_sentence("He ran.!?"));
    }

    #[test]
    fn test_validate_rejects_over_fifty_words() {
        let long = format!("The {} end.", "very ".repeat(50));
        assert!(!validate_sentence(&long));
    }

    #[test]
    fn test_chunk_groups_of_two_with_short_tail() {
        let text = "The fox woke at dawn. It crossed the frozen river. The wind was sharp and cold.";
        let chunks = chunk_text(text, &ChunkConfig::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0],
            "The fox woke at dawn. It crossed the frozen river."
        );
        assert_eq!(chunks[1], "The wind was sharp and cold.");
    }

    #[test]
    fn test_chunk_round_trip_preserves_sentences() {
        let text = "The fox woke at dawn. It crossed the frozen river. The wind was sharp and cold. Snow fell without a sound.";
        let valid: Vec<String> = split_sentences(text)
            .into_iter()
            .filter(|s| validate_sentence(s))
            .collect();

        let chunks = chunk_text(text, &ChunkConfig::default());
        let rejoined = chunks.join(" ");
        let round_tripped = split_sentences(&rejoined);

        assert_eq!(round_tripped, valid);
    }

    #[test]
    fn test_chunk_skips_invalid_sentences() {
        let text = "The fox woke at dawn. lowercase junk here. It crossed the frozen river.";
        let chunks = chunk_text(text, &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].contains("lowercase"));
    }
}
