//! Interned string atoms
//!
//! A [`Symbol`] is a cheap-to-clone, immutable string value. Equal strings
//! handed out by the same [`SymbolTable`] share one allocation. The table is
//! owned by whoever needs it (usually the lexicon); there is no global state.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Reserved symbol names shared by the lexicon, rules and charts
pub mod reserved {
    /// Absent affix slot, empty normalization result
    pub const NONE: &str = "-NONE-";
    /// Stem category for words the lexicon does not know
    pub const UNKNOWN: &str = "UNKNOWN";
    /// Category of segments synthesized by an earlier pass
    pub const ADDED: &str = "ADDED";
    /// Top-level category of analyses produced by retokenization
    pub const RETOKENIZED: &str = "RETOKENIZED";
    /// Category of composite entries built by the segmenter
    pub const SEGMENTED: &str = "SEGMENTED";
    /// Lexicon key for canned entries of an empty word
    pub const EMPTY_STRING: &str = "EMPTY_STRING";
    /// Lexicon key for canned entries of a word without Arabic letters
    pub const NON_ARABIC: &str = "NON_ARABIC";
}

/// Immutable interned string
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a standalone symbol (not shared through a table)
    pub fn new(s: &str) -> Self {
        Symbol(Arc::from(s))
    }

    /// Borrow the underlying string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the reserved `-NONE-` symbol or an empty string
    pub fn is_none(&self) -> bool {
        self.0.is_empty() || &*self.0 == reserved::NONE
    }

    /// Number of characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol(Arc::from(s)))
    }
}

/// Thread-safe interner
#[derive(Debug, Default)]
pub struct SymbolTable {
    atoms: RwLock<HashSet<Symbol>>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared symbol for `s`, creating it on first use
    pub fn intern(&self, s: &str) -> Symbol {
        if let Ok(atoms) = self.atoms.read() {
            if let Some(existing) = atoms.get(s) {
                return existing.clone();
            }
        }
        match self.atoms.write() {
            Ok(mut atoms) => {
                if let Some(existing) = atoms.get(s) {
                    return existing.clone();
                }
                let sym = Symbol::new(s);
                atoms.insert(sym.clone());
                sym
            }
            // A poisoned table still yields a correct (unshared) symbol
            Err(_) => Symbol::new(s),
        }
    }

    /// Number of distinct interned strings
    pub fn len(&self) -> usize {
        self.atoms.read().map(|a| a.len()).unwrap_or(0)
    }

    /// True if nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
