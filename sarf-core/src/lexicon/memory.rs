//! In-memory lexicon with JSON loading
//!
//! Entries live in an id-addressed arena behind a lock, with a secondary
//! key index. Ids come from an atomic counter so that concurrent analyses
//! can allocate and register dynamic entries without coordination.

use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use super::{EntryId, FeatureBundle, LexicalEntry, Lexicon, Part, SegmentRef};
use crate::buckwalter;
use crate::error::{MorphError, Result};
use crate::symbol::{reserved, Symbol, SymbolTable};

/// Script used by keys and voweled forms in a lexicon file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Arabic,
    Buckwalter,
}

/// Declarative description of an entry, used by files and tests alike
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrySpec {
    pub key: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "part_of_speech")]
    pub pos: Option<String>,
    #[serde(default)]
    pub voweled: Option<String>,
    #[serde(default)]
    pub gloss: Option<String>,
    #[serde(default)]
    pub analyzed: bool,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
}

/// Child of a pre-analyzed entry
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSpec {
    pub part: Part,
    #[serde(flatten)]
    pub entry: EntrySpec,
}

impl EntrySpec {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn pos(mut self, pos: &str) -> Self {
        self.pos = Some(pos.to_string());
        self
    }

    pub fn voweled(mut self, voweled: &str) -> Self {
        self.voweled = Some(voweled.to_string());
        self
    }

    pub fn gloss(mut self, gloss: &str) -> Self {
        self.gloss = Some(gloss.to_string());
        self
    }

    pub fn analyzed(mut self) -> Self {
        self.analyzed = true;
        self
    }

    pub fn segment(mut self, part: Part, entry: EntrySpec) -> Self {
        self.segments.push(SegmentSpec { part, entry });
        self
    }

    fn transliterated(&self, encoding: Encoding) -> Self {
        match encoding {
            Encoding::Arabic => self.clone(),
            Encoding::Buckwalter => Self {
                key: buckwalter::to_arabic(&self.key),
                voweled: self.voweled.as_deref().map(buckwalter::to_arabic),
                segments: self
                    .segments
                    .iter()
                    .map(|s| SegmentSpec {
                        part: s.part,
                        entry: s.entry.transliterated(encoding),
                    })
                    .collect(),
                ..self.clone()
            },
        }
    }
}

/// On-disk lexicon layout
#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    encoding: Encoding,
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<EntryId, Arc<LexicalEntry>>,
    by_key: HashMap<Symbol, SmallVec<[EntryId; 4]>>,
    dynamic: usize,
}

impl Store {
    fn insert(&mut self, entry: LexicalEntry) -> Result<Arc<LexicalEntry>> {
        if self.entries.contains_key(&entry.id) {
            return Err(MorphError::InternalInconsistency(format!(
                "entry id {} registered twice",
                entry.id
            )));
        }
        if let Some(missing) = entry
            .segments
            .iter()
            .find(|s| !self.entries.contains_key(&s.entry))
        {
            return Err(MorphError::InternalInconsistency(format!(
                "entry {} refers to unregistered segment {}",
                entry.key, missing.entry
            )));
        }
        let entry = Arc::new(entry);
        self.by_key
            .entry(entry.key.clone())
            .or_default()
            .push(entry.id);
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn find_identical(&self, key: &str, features: &FeatureBundle, segments: &[SegmentRef]) -> Option<Arc<LexicalEntry>> {
        self.by_key.get(key)?.iter().find_map(|id| {
            let existing = self.entries.get(id)?;
            (existing.features.as_ref() == Some(features) && existing.segments == segments)
                .then(|| existing.clone())
        })
    }
}

/// Lexicon held entirely in memory
#[derive(Debug)]
pub struct MemoryLexicon {
    symbols: SymbolTable,
    next_id: AtomicU32,
    store: RwLock<Store>,
}

impl Default for MemoryLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLexicon {
    /// Create a lexicon holding only the canned entries
    pub fn new() -> Self {
        let lexicon = Self::empty();
        if let Err(e) = lexicon.ensure_canned() {
            log::error!("failed to register canned entries: {e}");
        }
        lexicon
    }

    fn empty() -> Self {
        Self {
            symbols: SymbolTable::new(),
            next_id: AtomicU32::new(0),
            store: RwLock::new(Store::default()),
        }
    }

    /// Load a JSON lexicon file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a JSON lexicon from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: LexiconFile = serde_json::from_reader(reader)?;
        Self::from_lexicon_file(file)
    }

    /// Load a JSON lexicon from a string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::from_lexicon_file(file)
    }

    fn from_lexicon_file(file: LexiconFile) -> Result<Self> {
        let lexicon = Self::empty();
        for spec in &file.entries {
            lexicon.insert(spec.transliterated(file.encoding))?;
        }
        lexicon.ensure_canned()?;
        log::debug!(
            "loaded lexicon: {} entries, {} keys",
            lexicon.len(),
            lexicon.key_count()
        );
        Ok(lexicon)
    }

    fn ensure_canned(&self) -> Result<()> {
        for key in [reserved::EMPTY_STRING, reserved::NON_ARABIC] {
            if !self.has_key(key) {
                self.insert(EntrySpec::new(key).category(key).pos(key).analyzed())?;
            }
        }
        Ok(())
    }

    /// Build a feature bundle from a spec, interning every field
    pub fn features_for(&self, spec: &EntrySpec) -> FeatureBundle {
        let sym = |s: &Option<String>| self.symbols.intern(s.as_deref().unwrap_or(reserved::NONE));
        FeatureBundle {
            category: sym(&spec.category),
            part_of_speech: sym(&spec.pos),
            voweled: sym(&spec.voweled),
            gloss: sym(&spec.gloss),
            analyzed: spec.analyzed,
        }
    }

    /// Register a static entry and its segments
    ///
    /// Segments identical to an existing entry (same key, features and
    /// children) reuse that entry instead of duplicating it.
    pub fn insert(&self, spec: EntrySpec) -> Result<Arc<LexicalEntry>> {
        let mut segments = Vec::with_capacity(spec.segments.len());
        for child in &spec.segments {
            let entry = self.insert_or_reuse(child.entry.clone())?;
            segments.push(SegmentRef {
                part: child.part,
                entry: entry.id,
            });
        }
        let features = self.features_for(&spec);
        let entry = LexicalEntry {
            id: self.next_id(),
            key: self.symbols.intern(&spec.key),
            features: Some(features),
            segments,
        };
        self.write()?.insert(entry)
    }

    fn insert_or_reuse(&self, spec: EntrySpec) -> Result<Arc<LexicalEntry>> {
        if spec.segments.is_empty() {
            let features = self.features_for(&spec);
            if let Some(existing) = self.read()?.find_identical(&spec.key, &features, &[]) {
                return Ok(existing);
            }
        }
        self.insert(spec)
    }

    /// Total number of entries, canned and dynamic included
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    /// True if the lexicon holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.store.read().map(|s| s.by_key.len()).unwrap_or(0)
    }

    /// Number of entries added through [`Lexicon::add_dynamic_entry`]
    pub fn dynamic_len(&self) -> usize {
        self.store.read().map(|s| s.dynamic).unwrap_or(0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| MorphError::InternalInconsistency("lexicon lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| MorphError::InternalInconsistency("lexicon lock poisoned".to_string()))
    }
}

impl Lexicon for MemoryLexicon {
    fn has_key(&self, key: &str) -> bool {
        self.store
            .read()
            .map(|s| s.by_key.contains_key(key))
            .unwrap_or(false)
    }

    fn entries_by_key(&self, key: &str) -> Vec<Arc<LexicalEntry>> {
        let Ok(store) = self.store.read() else {
            return Vec::new();
        };
        store
            .by_key
            .get(key)
            .map(|ids| ids.iter().filter_map(|id| store.entries.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    fn entry(&self, id: EntryId) -> Option<Arc<LexicalEntry>> {
        self.store.read().ok()?.entries.get(&id).cloned()
    }

    fn next_id(&self) -> EntryId {
        EntryId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn add_dynamic_entry(&self, entry: LexicalEntry) -> Result<Arc<LexicalEntry>> {
        let mut store = self.write()?;
        let entry = store.insert(entry)?;
        store.dynamic += 1;
        log::trace!("registered dynamic entry {} ({})", entry.id, entry.key);
        Ok(entry)
    }

    fn get_or_add_dynamic(
        &self,
        key: &str,
        matches: &dyn Fn(&LexicalEntry) -> bool,
        make: &mut dyn FnMut(EntryId) -> LexicalEntry,
    ) -> Result<Arc<LexicalEntry>> {
        let mut store = self.write()?;
        let existing = store.by_key.get(key).and_then(|ids| {
            ids.iter()
                .filter_map(|id| store.entries.get(id))
                .find(|e| matches(e))
                .cloned()
        });
        if let Some(entry) = existing {
            return Ok(entry);
        }
        let entry = store.insert(make(self.next_id()))?;
        store.dynamic += 1;
        log::trace!("registered dynamic entry {} ({})", entry.id, entry.key);
        Ok(entry)
    }

    fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_has_canned_entries() {
        let lex = MemoryLexicon::new();
        assert!(lex.has_key(reserved::EMPTY_STRING));
        assert!(lex.has_key(reserved::NON_ARABIC));
        assert_eq!(lex.len(), 2);
        assert!(lex.entries_by_key(reserved::NON_ARABIC)[0].is_canned());
    }

    #[test]
    fn test_insert_and_lookup() {
        let lex = MemoryLexicon::new();
        let entry = lex
            .insert(EntrySpec::new("كتب").category("PV").pos("VERB").voweled("كَتَبَ"))
            .unwrap();
        assert!(lex.has_key("كتب"));
        let found = lex.entries_by_key("كتب");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, entry.id);
        assert_eq!(lex.entry(entry.id).unwrap().key, "كتب");
        assert_eq!(entry.require_features().unwrap().part_of_speech, "VERB");
    }

    #[test]
    fn test_bounded_lookup_fails_over_capacity() {
        let lex = MemoryLexicon::new();
        for pos in ["A", "B", "C"] {
            lex.insert(EntrySpec::new("x").category(pos).pos(pos)).unwrap();
        }
        assert_eq!(lex.entries_by_key_bounded("x", 3).unwrap().len(), 3);
        let err = lex.entries_by_key_bounded("x", 2).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Capacity);
    }

    #[test]
    fn test_dynamic_entry_registration() {
        let lex = MemoryLexicon::new();
        let id = lex.next_id();
        let features = lex.features_for(&EntrySpec::new("zzz").category(reserved::UNKNOWN));
        let entry = LexicalEntry::leaf(id, lex.intern("zzz"), features);
        lex.add_dynamic_entry(entry.clone()).unwrap();
        assert_eq!(lex.dynamic_len(), 1);
        assert!(lex.has_key("zzz"));

        // same id twice is an inconsistency
        assert!(lex.add_dynamic_entry(entry).is_err());
    }

    #[test]
    fn test_get_or_add_dynamic_is_atomic() {
        let lex = MemoryLexicon::new();
        let features = lex.features_for(&EntrySpec::new("zzz").category(reserved::UNKNOWN));
        let key = lex.intern("zzz");
        let barrier = std::sync::Barrier::new(8);

        let ids: Vec<EntryId> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        lex.get_or_add_dynamic(
                            "zzz",
                            &|e: &LexicalEntry| e.is_leaf(),
                            &mut |id| LexicalEntry::leaf(id, key.clone(), features.clone()),
                        )
                        .unwrap()
                        .id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(lex.entries_by_key("zzz").len(), 1);
        assert_eq!(lex.dynamic_len(), 1);
    }

    #[test]
    fn test_dangling_segment_rejected() {
        let lex = MemoryLexicon::new();
        let entry = LexicalEntry {
            id: lex.next_id(),
            key: lex.intern("w"),
            features: None,
            segments: vec![SegmentRef {
                part: Part::Stem,
                entry: EntryId(9999),
            }],
        };
        let err = lex.add_dynamic_entry(entry).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Internal);
    }

    #[test]
    fn test_json_buckwalter_loading() {
        let json = r#"{
            "encoding": "buckwalter",
            "entries": [
                {"key": "ktb", "category": "PV", "pos": "VERB", "voweled": "kataba", "gloss": "write"},
                {"key": "wktb", "category": "RETOKENIZED", "pos": "VERB", "analyzed": true,
                 "segments": [
                    {"part": "prefix", "key": "w", "category": "Pref-Wa", "pos": "CONJ"},
                    {"part": "stem", "key": "ktb", "category": "PV", "pos": "VERB", "voweled": "kataba", "gloss": "write"}
                 ]}
            ]
        }"#;
        let lex = MemoryLexicon::from_json_str(json).unwrap();
        assert!(lex.has_key("كتب"));
        assert!(lex.has_key("و"));
        // the nested stem is identical to the first entry and is reused
        assert_eq!(lex.entries_by_key("كتب").len(), 1);
        let word = &lex.entries_by_key("وكتب")[0];
        assert_eq!(word.segments.len(), 2);
        assert_eq!(word.segments[1].entry, lex.entries_by_key("كتب")[0].id);
        assert!(word.is_analyzed());
        assert!(lex.has_key(reserved::EMPTY_STRING));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"entries": [{{"key": "ب", "category": "Pref-Bi", "pos": "PREP"}}]}}"#).unwrap();
        let lex = MemoryLexicon::from_file(file.path()).unwrap();
        assert!(lex.has_key("ب"));
        assert_eq!(lex.len(), 3);
    }

    #[test]
    fn test_malformed_json() {
        let err = MemoryLexicon::from_json_str("{\"entries\": [").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Input);
    }
}
