//! Lexicon seam
//!
//! The morphology core never owns lexical data. It queries a [`Lexicon`]
//! by key, resolves child segments by [`EntryId`], and registers dynamic
//! entries for words the lexicon does not know.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{MorphError, Result};
use crate::symbol::{reserved, Symbol, SymbolTable};

pub mod memory;

pub use memory::{Encoding, EntrySpec, MemoryLexicon, SegmentSpec};

/// Identity of a lexical entry, unique within one lexicon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot a segment fills inside a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Prefix,
    Stem,
    Suffix,
    /// Segment of an analysis produced by a prior retokenization pass
    Retokenized,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Part::Prefix => "PREFIX",
            Part::Stem => "STEM",
            Part::Suffix => "SUFFIX",
            Part::Retokenized => "RETOKENIZED",
        };
        f.write_str(s)
    }
}

/// Morphological features attached to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBundle {
    pub category: Symbol,
    pub part_of_speech: Symbol,
    pub voweled: Symbol,
    pub gloss: Symbol,
    /// The entry is a complete analysis and needs no segmentation
    pub analyzed: bool,
}

impl FeatureBundle {
    /// True when the category carries information
    pub fn is_categorized(&self) -> bool {
        !self.category.is_none()
    }
}

/// Reference from a composite entry to one of its segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRef {
    pub part: Part,
    pub entry: EntryId,
}

/// One lexicon entry, possibly composed of child segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalEntry {
    pub id: EntryId,
    pub key: Symbol,
    pub features: Option<FeatureBundle>,
    pub segments: Vec<SegmentRef>,
}

impl LexicalEntry {
    /// Create a leaf entry
    pub fn leaf(id: EntryId, key: Symbol, features: FeatureBundle) -> Self {
        Self {
            id,
            key,
            features: Some(features),
            segments: Vec::new(),
        }
    }

    /// True when the entry has no child segments
    pub fn is_leaf(&self) -> bool {
        self.segments.is_empty()
    }

    /// Category symbol, if the entry has features
    pub fn category(&self) -> Option<&Symbol> {
        self.features.as_ref().map(|f| &f.category)
    }

    /// True when the entry is flagged as a finished analysis
    pub fn is_analyzed(&self) -> bool {
        self.features.as_ref().is_some_and(|f| f.analyzed)
    }

    /// True for the lexicon's canned empty-word / non-Arabic entries
    pub fn is_canned(&self) -> bool {
        self.key == reserved::EMPTY_STRING || self.key == reserved::NON_ARABIC
    }

    /// Features or an inconsistency error naming this entry
    pub fn require_features(&self) -> Result<&FeatureBundle> {
        self.features.as_ref().ok_or_else(|| {
            MorphError::InternalInconsistency(format!(
                "entry {} ({}) has no feature bundle",
                self.id, self.key
            ))
        })
    }
}

/// Key-addressed store of lexical entries
///
/// Implementations are shared across concurrent analyses. Reads take
/// `&self`; dynamic insertion must serialize internally.
pub trait Lexicon: Send + Sync {
    /// Does any entry exist under `key`?
    fn has_key(&self, key: &str) -> bool;

    /// All entries registered under `key`, in registration order
    fn entries_by_key(&self, key: &str) -> Vec<Arc<LexicalEntry>>;

    /// Resolve an entry by id
    fn entry(&self, id: EntryId) -> Option<Arc<LexicalEntry>>;

    /// Allocate a fresh entry id
    fn next_id(&self) -> EntryId;

    /// Register an entry created at analysis time
    fn add_dynamic_entry(&self, entry: LexicalEntry) -> Result<Arc<LexicalEntry>>;

    /// Entry under `key` accepted by `matches`, or a new one built by `make`
    /// from a fresh id and registered
    ///
    /// Lookup and registration happen under one write lock, so concurrent
    /// callers asking for the same entry end up sharing it.
    fn get_or_add_dynamic(
        &self,
        key: &str,
        matches: &dyn Fn(&LexicalEntry) -> bool,
        make: &mut dyn FnMut(EntryId) -> LexicalEntry,
    ) -> Result<Arc<LexicalEntry>>;

    /// Interner shared by this lexicon's entries
    fn symbols(&self) -> &SymbolTable;

    /// Entries under `key`, failing when there are more than `max`
    fn entries_by_key_bounded(&self, key: &str, max: usize) -> Result<Vec<Arc<LexicalEntry>>> {
        let entries = self.entries_by_key(key);
        if entries.len() > max {
            return Err(MorphError::capacity("lexicon entries per key", max));
        }
        Ok(entries)
    }

    /// Resolve an entry or report the dangling id
    fn require_entry(&self, id: EntryId) -> Result<Arc<LexicalEntry>> {
        self.entry(id).ok_or_else(|| {
            MorphError::InternalInconsistency(format!("entry {id} is not registered"))
        })
    }

    /// Intern a string through this lexicon's table
    fn intern(&self, s: &str) -> Symbol {
        self.symbols().intern(s)
    }
}
