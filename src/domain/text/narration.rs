//! 旁白切片
//!
//! 叙述服务单条消息的文本上限为 100 字符，每个句子对应一条消息。
//! 超长句子按词切分（补句点），仍超长则按字符硬切。

use super::chunker::split_sentences;

/// 单条旁白消息的最大字符数
pub const MAX_NARRATION_CHARS: usize = 100;

/// 将段落文本切为不超过 `limit` 字符的旁白片段，每句一片
///
/// 非空输入保证至少产出一个片段
pub fn narration_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();

    for sentence in split_sentences(text) {
        if sentence.chars().count() <= limit {
            chunks.push(sentence);
        } else {
            split_long_sentence(&sentence, limit, &mut chunks);
        }
    }

    chunks
}

/// 按词切分超长句子，每片补句点维持语调；单词本身超长时按字符硬切
fn split_long_sentence(sentence: &str, limit: usize, chunks: &mut Vec<String>) {
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        if word.chars().count() + 1 > limit {
            push_with_period(chunks, &mut current, limit);
            hard_split(word, limit, chunks);
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count() + 1
        } else {
            current.chars().count() + 1 + word.chars().count() + 1
        };
        if needed > limit {
            push_with_period(chunks, &mut current, limit);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    push_with_period(chunks, &mut current, limit);
}

fn push_with_period(chunks: &mut Vec<String>, current: &mut String, limit: usize) {
    if current.is_empty() {
        return;
    }
    let mut piece = std::mem::take(current);
    if !piece.ends_with(['.', '!', '?']) && piece.chars().count() < limit {
        piece.push('.');
    }
    chunks.push(piece);
}

fn hard_split(word: &str, limit: usize, chunks: &mut Vec<String>) {
    let chars: Vec<char> = word.chars().collect();
    for piece in chars.chunks(limit) {
        chunks.push(piece.iter().collect());
    }
}
