// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

// Rough heuristic: one token is about four characters of text.
const CHARS_PER_TOKEN: usize = 4;

/// 估算文本的令牌数
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// 按令牌阈值切分文本
///
/// 优先在段落边界（空行）切分，保持原始顺序；
/// 单个段落超过阈值时按字符硬切分。空输入返回空列表。
pub fn split_by_token_threshold(text: &str, chunk_token_threshold: usize) -> Vec<String> {
    let max_chars = chunk_token_threshold.max(1).saturating_mul(CHARS_PER_TOKEN);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim_end();
        if paragraph.is_empty() {
            continue;
        }

        let pieces: Vec<String> = if paragraph.chars().count() > max_chars {
            hard_split(paragraph, max_chars)
        } else {
            vec![paragraph.to_string()]
        };

        for piece in pieces {
            let separator_len = if current.is_empty() { 0 } else { 2 };
            if !current.is_empty()
                && current.chars().count() + separator_len + piece.chars().count() > max_chars
            {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn hard_split(paragraph: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
