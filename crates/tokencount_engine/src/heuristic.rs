use crate::TokenCounter;

/// Short function words that almost always encode as a single token.
const COMMON_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "by", "for", "with", "to", "of",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her",
    "us", "them", "this", "that", "these", "those", "my", "your", "his", "its", "our", "their",
];

const SINGLE_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'',
];

/// Word, punctuation and whitespace approximation of a BPE token count.
///
/// Used whenever the exact tokenizer is unavailable. It never fails and only
/// looks at the string itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> u32 {
        if text.trim().is_empty() {
            return 0;
        }
        let words: usize = text
            .trim()
            .split(is_space)
            .filter(|word| !word.is_empty())
            .map(word_cost)
            .sum();
        saturate(words + structural_tokens(text))
    }
}

fn word_cost(word: &str) -> usize {
    if is_common_word(word) || is_number(word) || is_single_punctuation(word) {
        return 1;
    }
    // UTF-16 units, so a non-BMP char weighs two.
    match word.encode_utf16().count() {
        0..=4 => 1,
        5..=7 => 2,
        8..=10 => 3,
        11..=15 => 4,
        len => len / 4 + 1,
    }
}

/// Space, tab, line feed, vertical tab, form feed and carriage return. Other
/// Unicode spaces belong to the word they sit in.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn is_common_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    COMMON_WORDS.contains(&lower.as_str())
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

fn is_single_punctuation(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if SINGLE_PUNCTUATION.contains(&c))
}

/// Newline pairs, tabs and long whitespace runs each add a token.
fn structural_tokens(text: &str) -> usize {
    let mut newlines = 0;
    let mut tabs = 0;
    let mut long_runs = 0;
    let mut run = 0;

    for c in text.chars() {
        match c {
            '\n' => newlines += 1,
            '\t' => tabs += 1,
            _ => {}
        }
        if is_space(c) {
            run += 1;
        } else {
            if run >= 3 {
                long_runs += 1;
            }
            run = 0;
        }
    }
    if run >= 3 {
        long_runs += 1;
    }

    newlines / 2 + tabs + long_runs
}

fn saturate(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
