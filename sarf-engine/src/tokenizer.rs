//! Whitespace and punctuation tokenizer
//!
//! A minimal adapter producing character spans for the analyzer. Tokens are
//! maximal runs of non-space characters; with punctuation splitting on,
//! every punctuation character becomes a token of its own.

/// Arabic punctuation not covered by `char::is_ascii_punctuation`
const ARABIC_PUNCTUATION: &[char] = &[
    '\u{060C}', // comma
    '\u{061B}', // semicolon
    '\u{061F}', // question mark
    '\u{066A}', // percent sign
    '\u{066B}', // decimal separator
    '\u{066C}', // thousands separator
    '\u{06D4}', // full stop
    '\u{00AB}', // left guillemet
    '\u{00BB}', // right guillemet
];

/// True for characters split off as separate tokens
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || ARABIC_PUNCTUATION.contains(&c)
}

/// Splits sentences into token spans
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    split_punctuation: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Tokenizer {
    /// Create a tokenizer
    pub fn new(split_punctuation: bool) -> Self {
        Self { split_punctuation }
    }

    /// Token spans as `[start, end)` character indices
    pub fn tokenize(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start: Option<usize> = None;

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    spans.push((s, i));
                }
            } else if self.split_punctuation && is_punctuation(c) {
                if let Some(s) = start.take() {
                    spans.push((s, i));
                }
                spans.push((i, i + 1));
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            spans.push((s, text.chars().count()));
        }
        spans
    }
}
