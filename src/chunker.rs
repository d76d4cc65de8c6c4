// src/chunker.rs
// Sentence-aware splitting of long text into size-bounded pieces.
// All sizes are character counts, never byte counts.

use once_cell::sync::Lazy;
use regex::Regex;

/// A run of non-terminators closed by one or more of `.`, `!`, `?`, or a
/// trailing fragment with no terminator. Together the alternatives cover the
/// whole input, so tokenizing never drops text.
static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]*[.!?]+|[^.!?]+").expect("sentence regex is valid"));

/// Split text into trimmed, non-empty sentence-like tokens.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits text into ordered chunks of at most `max_chars` characters,
/// breaking on sentence boundaries where possible.
///
/// Sentences are re-joined with a single space inside a chunk. A sentence
/// longer than `max_chars` is cut at the character boundary; its pieces are
/// emitted as they fill up and the final piece keeps accumulating with the
/// following sentences. Every returned chunk is non-empty and within the limit.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if char_len(trimmed) <= max_chars {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(trimmed) {
        let sentence_len = char_len(sentence);
        let joined_len = if current.is_empty() {
            sentence_len
        } else {
            current_len + 1 + sentence_len
        };

        if joined_len <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
            current_len = joined_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if sentence_len <= max_chars {
            current.push_str(sentence);
            current_len = sentence_len;
        } else {
            let mut pieces = hard_split(sentence, max_chars);
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current_len = char_len(&last);
                current = last;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Character-boundary split with no regard for words.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect::<String>().trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
