//! Text with document offsets
//!
//! A [`LocatedString`] remembers, for each of its characters, the offset that
//! character had in the original document. Sentences are usually contiguous
//! slices of a document but nothing here assumes so.

use std::sync::Arc;

use crate::lexicon::LexicalEntry;

/// Characters paired with their document offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedString {
    chars: Vec<char>,
    offsets: Vec<usize>,
    end: usize,
}

impl LocatedString {
    /// Text starting at document offset 0
    pub fn new(text: &str) -> Self {
        Self::with_base(text, 0)
    }

    /// Text whose first character sits at document offset `base`
    pub fn with_base(text: &str, base: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let offsets = (base..base + chars.len()).collect();
        let end = base + chars.len();
        Self { chars, offsets, end }
    }

    /// Text with explicit per-character offsets
    ///
    /// Returns `None` when the two sequences differ in length.
    pub fn from_parts(chars: Vec<char>, offsets: Vec<usize>) -> Option<Self> {
        if chars.len() != offsets.len() {
            return None;
        }
        let end = offsets.last().map(|o| o + 1).unwrap_or(0);
        Some(Self { chars, offsets, end })
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at index `i`
    pub fn char_at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    /// Characters in `[start, end)`, clamped to the string
    pub fn chars(&self, start: usize, end: usize) -> &[char] {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        &self.chars[start..end]
    }

    /// Substring over character indices `[start, end)`
    pub fn substring(&self, start: usize, end: usize) -> String {
        self.chars(start, end).iter().collect()
    }

    /// Document offset of character `i`; past the end yields the end offset
    pub fn start_offset(&self, i: usize) -> usize {
        self.offsets.get(i).copied().unwrap_or(self.end)
    }

    /// Exclusive document end offset of character `i`
    pub fn end_offset(&self, i: usize) -> usize {
        self.offsets.get(i).map(|o| o + 1).unwrap_or(self.end)
    }

    /// Document range covered by character indices `[start, end)`
    pub fn span_offsets(&self, start: usize, end: usize) -> (usize, usize) {
        let doc_start = self.start_offset(start);
        if end <= start {
            return (doc_start, doc_start);
        }
        (doc_start, self.end_offset(end - 1).max(doc_start))
    }
}

impl std::fmt::Display for LocatedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// A token of a sentence and its competing analyses
#[derive(Debug, Clone)]
pub struct Token {
    /// First character index in the sentence
    pub start: usize,
    /// Character index just past the token
    pub end: usize,
    /// Candidate analyses, one lexical entry each
    pub analyses: Vec<Arc<LexicalEntry>>,
}

impl Token {
    pub fn new(start: usize, end: usize, analyses: Vec<Arc<LexicalEntry>>) -> Self {
        Self { start, end, analyses }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The token's text within `sentence`
    pub fn text(&self, sentence: &LocatedString) -> String {
        sentence.substring(self.start, self.end)
    }

    /// Document range of the token
    pub fn offsets(&self, sentence: &LocatedString) -> (usize, usize) {
        sentence.span_offsets(self.start, self.end)
    }
}
