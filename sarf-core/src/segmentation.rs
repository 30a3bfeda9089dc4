//! Segmentation chart builder
//!
//! Splits a normalized word into every prefix/stem/suffix combination the
//! lexicon can support, keeps the combinations the rule dictionary allows,
//! and turns the survivors into composite lexical entries.
//!
//! Solutions fall into two lists. A solution whose stem has a real category
//! is "known"; a solution whose stem is missing from the lexicon or carries
//! the UNKNOWN category is "unknown". Unknown solutions are only used when
//! no known solution exists.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::capacity::Capacities;
use crate::error::{MorphError, Result};
use crate::lexicon::{FeatureBundle, LexicalEntry, Lexicon, Part, SegmentRef};
use crate::normalizer::{contains_arabic, Normalizer};
use crate::rules::RuleDictionary;
use crate::symbol::{reserved, Symbol};
use crate::warning::Warning;

/// Prefix and suffix lengths of one split, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

/// A legal prefix/stem/suffix combination
#[derive(Debug, Clone)]
pub struct Solution {
    /// `None` for a zero-length prefix
    pub prefix: Option<Arc<LexicalEntry>>,
    /// `None` when the stem is not in the lexicon
    pub stem: Option<Arc<LexicalEntry>>,
    /// `None` for a zero-length suffix
    pub suffix: Option<Arc<LexicalEntry>>,
    /// The stem substring
    pub stem_key: String,
    /// The whole normalized word
    pub word: String,
}

impl Solution {
    /// `prefix+stem+suffix` rendering used in logs and warnings
    pub fn describe(&self) -> String {
        let key = |e: &Option<Arc<LexicalEntry>>| e.as_ref().map(|e| e.key.to_string());
        [key(&self.prefix), Some(self.stem_key.clone()), key(&self.suffix)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Where the entries of a [`Segmentation`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationSource {
    /// Canned entries for a word that normalizes to nothing
    EmptyWord,
    /// Canned entries for a word without Arabic letters
    NonArabic,
    /// Pre-analyzed lexicon entries for the whole word
    Analyzed,
    /// Built from known-stem solutions
    KnownStem,
    /// Built from unknown-stem solutions
    UnknownStem,
    /// Fabricated whole-word entry
    Fallback,
}

/// Result of analyzing one word
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub entries: Vec<Arc<LexicalEntry>>,
    pub source: SegmentationSource,
    pub warnings: Vec<Warning>,
}

/// Per-call working storage of the builder
#[derive(Debug)]
pub struct SegmentationChart {
    word: String,
    splits: Vec<Split>,
    matched: Vec<Split>,
    known: Vec<Solution>,
    unknown: Vec<Solution>,
    max_solutions: usize,
}

impl SegmentationChart {
    fn new(word: &str, max_solutions: usize) -> Self {
        Self {
            word: word.to_string(),
            splits: Vec::new(),
            matched: Vec::new(),
            known: Vec::new(),
            unknown: Vec::new(),
            max_solutions,
        }
    }

    fn push_known(&mut self, solution: Solution) -> Result<()> {
        if self.known.len() >= self.max_solutions {
            return Err(MorphError::capacity("known-stem solutions", self.max_solutions));
        }
        self.known.push(solution);
        Ok(())
    }

    fn push_unknown(&mut self, solution: Solution) -> Result<()> {
        if self.unknown.len() >= self.max_solutions {
            return Err(MorphError::capacity("unknown-stem solutions", self.max_solutions));
        }
        self.unknown.push(solution);
        Ok(())
    }

    /// Every split enumerated, in enumeration order
    pub fn splits_considered(&self) -> &[Split] {
        &self.splits
    }

    /// Splits whose affixes were both found in the lexicon
    pub fn splits_matched(&self) -> &[Split] {
        &self.matched
    }

    pub fn known_solutions(&self) -> &[Solution] {
        &self.known
    }

    pub fn unknown_solutions(&self) -> &[Solution] {
        &self.unknown
    }

    /// Human-readable listing for debugging
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "chart '{}': {} splits, {} matched",
            self.word,
            self.splits.len(),
            self.matched.len()
        );
        for (label, list) in [("known", &self.known), ("unknown", &self.unknown)] {
            for s in list {
                let _ = writeln!(out, "  {label}: {}", s.describe());
            }
        }
        out
    }
}

/// Category used for rule checks; absent slots use `-NONE-`
fn slot_category(entry: &Option<Arc<LexicalEntry>>) -> Result<&str> {
    match entry {
        Some(e) => Ok(e.require_features()?.category.as_str()),
        None => Ok(reserved::NONE),
    }
}

/// String a segment contributes to a composite's voweled form
fn display_form(entry: &LexicalEntry) -> &str {
    match &entry.features {
        Some(f) if f.is_categorized() && !f.voweled.is_none() => f.voweled.as_str(),
        _ => entry.key.as_str(),
    }
}

/// Word segmenter bound to one rule dictionary and lexicon
pub struct Segmenter<'a> {
    rules: &'a RuleDictionary,
    lexicon: &'a dyn Lexicon,
    caps: Capacities,
    normalizer: Normalizer,
}

impl<'a> Segmenter<'a> {
    pub fn new(rules: &'a RuleDictionary, lexicon: &'a dyn Lexicon, caps: Capacities) -> Self {
        Self {
            rules,
            lexicon,
            caps,
            normalizer: Normalizer::with_max_len(caps.max_word_chars),
        }
    }

    /// Analyze one word, keeping at most `max_results` entries
    pub fn analyze(&self, word: &str, max_results: usize) -> Result<Segmentation> {
        let normalized = self.normalizer.normalize(word)?;

        if normalized.is_empty() || normalized == reserved::NONE {
            return self.canned(reserved::EMPTY_STRING, SegmentationSource::EmptyWord);
        }
        if !contains_arabic(word) {
            return self.canned(reserved::NON_ARABIC, SegmentationSource::NonArabic);
        }

        let mut warnings = Vec::new();

        let analyzed: Vec<_> = self
            .lexicon
            .entries_by_key(&normalized)
            .into_iter()
            .filter(|e| e.is_analyzed())
            .collect();
        if !analyzed.is_empty() {
            log::trace!("'{normalized}' is pre-analyzed ({} entries)", analyzed.len());
            let entries = truncate(analyzed, max_results, &normalized, &mut warnings);
            return Ok(Segmentation {
                entries,
                source: SegmentationSource::Analyzed,
                warnings,
            });
        }

        let chart = self.build_chart(&normalized)?;
        log::trace!("{}", chart.dump());

        let (entries, source) = if !chart.known.is_empty() {
            let entries = chart
                .known
                .iter()
                .map(|s| self.composite(s, s.stem.clone()))
                .collect::<Result<Vec<_>>>()?;
            (entries, SegmentationSource::KnownStem)
        } else if !chart.unknown.is_empty() {
            let mut stems: HashMap<String, Arc<LexicalEntry>> = HashMap::new();
            let mut entries = Vec::with_capacity(chart.unknown.len());
            for s in &chart.unknown {
                let stem = match &s.stem {
                    Some(stem) => stem.clone(),
                    None => match stems.get(&s.stem_key) {
                        Some(stem) => stem.clone(),
                        None => {
                            let stem = self.unknown_stem(&s.stem_key)?;
                            stems.insert(s.stem_key.clone(), stem.clone());
                            stem
                        }
                    },
                };
                entries.push(self.composite(s, Some(stem))?);
            }
            (entries, SegmentationSource::UnknownStem)
        } else {
            log::warn!("no legal segmentation for '{normalized}', using whole word");
            warnings.push(Warning::NoSegmentation {
                word: normalized.clone(),
            });
            (vec![self.whole_word(&normalized)?], SegmentationSource::Fallback)
        };

        let entries = truncate(entries, max_results, &normalized, &mut warnings);
        Ok(Segmentation {
            entries,
            source,
            warnings,
        })
    }

    /// Enumerate and filter every split of an already normalized word
    pub fn build_chart(&self, normalized: &str) -> Result<SegmentationChart> {
        let chars: Vec<char> = normalized.chars().collect();
        let n = chars.len();
        let mut chart = SegmentationChart::new(normalized, self.caps.max_solutions);
        let max = self.caps.max_entries_per_key;

        for prefix_len in 0..n {
            for suffix_len in 0..n - prefix_len {
                let split = Split {
                    prefix_len,
                    suffix_len,
                };
                chart.splits.push(split);

                let prefix: String = chars[..prefix_len].iter().collect();
                let stem: String = chars[prefix_len..n - suffix_len].iter().collect();
                let suffix: String = chars[n - suffix_len..].iter().collect();

                if (prefix_len > 0 && !self.lexicon.has_key(&prefix))
                    || (suffix_len > 0 && !self.lexicon.has_key(&suffix))
                {
                    continue;
                }
                chart.matched.push(split);

                let prefixes = self.slot_entries(&prefix, max)?;
                let suffixes = self.slot_entries(&suffix, max)?;
                let stems = self.lexicon.entries_by_key_bounded(&stem, max)?;

                for pe in &prefixes {
                    for se in &suffixes {
                        let a = slot_category(pe)?;
                        let c = slot_category(se)?;
                        if !self.rules.is_ac_permitted(a, c) {
                            continue;
                        }
                        let solution = |st: Option<Arc<LexicalEntry>>| Solution {
                            prefix: pe.clone(),
                            stem: st,
                            suffix: se.clone(),
                            stem_key: stem.clone(),
                            word: normalized.to_string(),
                        };

                        if stems.is_empty() {
                            chart.push_unknown(solution(None))?;
                            continue;
                        }
                        for st in &stems {
                            let b = st.require_features()?.category.as_str();
                            if b == reserved::UNKNOWN {
                                chart.push_unknown(solution(Some(st.clone())))?;
                            } else if self.rules.is_ab_permitted(a, b)
                                && self.rules.is_bc_permitted(b, c)
                            {
                                chart.push_known(solution(Some(st.clone())))?;
                            }
                        }
                    }
                }
            }
        }

        Ok(chart)
    }

    fn slot_entries(&self, key: &str, max: usize) -> Result<Vec<Option<Arc<LexicalEntry>>>> {
        if key.is_empty() {
            return Ok(vec![None]);
        }
        Ok(self
            .lexicon
            .entries_by_key_bounded(key, max)?
            .into_iter()
            .map(Some)
            .collect())
    }

    fn canned(&self, key: &str, source: SegmentationSource) -> Result<Segmentation> {
        let entries = self.lexicon.entries_by_key(key);
        if entries.is_empty() {
            return Err(MorphError::InternalInconsistency(format!(
                "lexicon has no canned '{key}' entries"
            )));
        }
        Ok(Segmentation {
            entries,
            source,
            warnings: Vec::new(),
        })
    }

    fn sym(&self, s: &str) -> Symbol {
        self.lexicon.intern(s)
    }

    /// Existing UNKNOWN entry for `key`, or a fresh registered one
    fn unknown_stem(&self, key: &str) -> Result<Arc<LexicalEntry>> {
        let features = self.unknown_features(false);
        let key_sym = self.sym(key);
        self.lexicon.get_or_add_dynamic(
            key,
            &|e: &LexicalEntry| {
                e.is_leaf() && e.category().is_some_and(|c| c == reserved::UNKNOWN)
            },
            &mut |id| LexicalEntry::leaf(id, key_sym.clone(), features.clone()),
        )
    }

    /// Degenerate analysis covering the whole word
    fn whole_word(&self, word: &str) -> Result<Arc<LexicalEntry>> {
        let features = self.unknown_features(true);
        let key_sym = self.sym(word);
        self.lexicon.get_or_add_dynamic(
            word,
            &|e: &LexicalEntry| {
                e.is_leaf()
                    && e.is_analyzed()
                    && e.category().is_some_and(|c| c == reserved::UNKNOWN)
            },
            &mut |id| LexicalEntry::leaf(id, key_sym.clone(), features.clone()),
        )
    }

    fn unknown_features(&self, analyzed: bool) -> FeatureBundle {
        FeatureBundle {
            category: self.sym(reserved::UNKNOWN),
            part_of_speech: self.sym(reserved::UNKNOWN),
            voweled: self.sym(reserved::NONE),
            gloss: self.sym(reserved::NONE),
            analyzed,
        }
    }

    /// Composite entry for a solution
    ///
    /// Composites get a fresh id but are not registered: their children are
    /// lexicon entries and remain resolvable through the lexicon.
    fn composite(&self, solution: &Solution, stem: Option<Arc<LexicalEntry>>) -> Result<Arc<LexicalEntry>> {
        let stem = stem.ok_or_else(|| {
            MorphError::InternalInconsistency(format!(
                "solution {} has no stem entry",
                solution.describe()
            ))
        })?;
        let stem_features = stem.require_features()?;

        let mut segments = Vec::with_capacity(3);
        let mut voweled = String::new();
        for (part, entry) in [
            (Part::Prefix, solution.prefix.as_ref()),
            (Part::Stem, Some(&stem)),
            (Part::Suffix, solution.suffix.as_ref()),
        ] {
            if let Some(entry) = entry {
                segments.push(SegmentRef {
                    part,
                    entry: entry.id,
                });
                voweled.push_str(display_form(entry));
            }
        }

        let features = FeatureBundle {
            category: self.sym(reserved::SEGMENTED),
            part_of_speech: stem_features.part_of_speech.clone(),
            voweled: self.sym(&voweled),
            gloss: stem_features.gloss.clone(),
            analyzed: false,
        };
        Ok(Arc::new(LexicalEntry {
            id: self.lexicon.next_id(),
            key: self.sym(&solution.word),
            features: Some(features),
            segments,
        }))
    }
}

fn describe_entry(entry: &LexicalEntry) -> String {
    let pos = entry
        .features
        .as_ref()
        .map(|f| f.part_of_speech.to_string())
        .unwrap_or_default();
    format!("{}/{pos}", entry.key)
}

fn truncate(
    mut entries: Vec<Arc<LexicalEntry>>,
    max_results: usize,
    word: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<Arc<LexicalEntry>> {
    if entries.len() > max_results {
        let dropped: Vec<String> = entries[max_results..]
            .iter()
            .map(|e| describe_entry(e))
            .collect();
        log::warn!(
            "'{word}': keeping {max_results} of {} analyses, dropped {}",
            entries.len(),
            dropped.join(" | ")
        );
        warnings.push(Warning::Truncated {
            word: word.to_string(),
            kept: max_results,
            dropped,
        });
        entries.truncate(max_results);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckwalter::to_arabic;
    use crate::lexicon::{EntrySpec, MemoryLexicon};
    use crate::rules::Position;

    fn ktb_fixture() -> (MemoryLexicon, RuleDictionary) {
        let lex = MemoryLexicon::new();
        lex.insert(EntrySpec::new(&to_arabic("k")).category("CONJ").pos("CONJ"))
            .unwrap();
        lex.insert(EntrySpec::new(&to_arabic("t")).category("STEM-cat").pos("NOUN"))
            .unwrap();
        lex.insert(EntrySpec::new(&to_arabic("b")).category("PRON").pos("PRON"))
            .unwrap();
        let mut rules = RuleDictionary::default();
        rules.insert(Position::A, "CONJ", Position::C, "PRON").unwrap();
        rules.insert(Position::A, "CONJ", Position::B, "STEM-cat").unwrap();
        rules.insert(Position::B, "STEM-cat", Position::C, "PRON").unwrap();
        (lex, rules)
    }

    #[test]
    fn test_known_stem_solution() {
        let (lex, rules) = ktb_fixture();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        let result = seg.analyze(&to_arabic("ktb"), 10).unwrap();

        assert_eq!(result.source, SegmentationSource::KnownStem);
        assert_eq!(result.entries.len(), 1);
        let word = &result.entries[0];
        assert_eq!(word.segments.len(), 3);
        let parts: Vec<Part> = word.segments.iter().map(|s| s.part).collect();
        assert_eq!(parts, vec![Part::Prefix, Part::Stem, Part::Suffix]);
        assert_eq!(word.key, to_arabic("ktb").as_str());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_chart_enumerates_all_splits() {
        let (lex, rules) = ktb_fixture();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        let chart = seg.build_chart(&to_arabic("ktb")).unwrap();
        assert_eq!(chart.splits_considered().len(), 6);
        assert_eq!(
            chart.splits_considered()[..3],
            [
                Split { prefix_len: 0, suffix_len: 0 },
                Split { prefix_len: 0, suffix_len: 1 },
                Split { prefix_len: 0, suffix_len: 2 },
            ]
        );
        assert_eq!(chart.known_solutions().len(), 1);
        assert!(chart.dump().contains("known"));
    }

    #[test]
    fn test_empty_word_returns_canned() {
        let (lex, rules) = ktb_fixture();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        // only diacritics
        let result = seg.analyze("\u{064E}\u{0651}", 10).unwrap();
        assert_eq!(result.source, SegmentationSource::EmptyWord);
        assert_eq!(result.entries[0].key, reserved::EMPTY_STRING);
    }

    #[test]
    fn test_non_arabic_returns_canned() {
        let (lex, rules) = ktb_fixture();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        let result = seg.analyze("ktb", 10).unwrap();
        assert_eq!(result.source, SegmentationSource::NonArabic);
        assert_eq!(result.entries[0].key, reserved::NON_ARABIC);
        assert_eq!(lex.dynamic_len(), 0);
    }

    #[test]
    fn test_pre_analyzed_word_bypasses_segmentation() {
        let (lex, rules) = ktb_fixture();
        let whole = lex
            .insert(EntrySpec::new(&to_arabic("ktb")).category("PV").pos("VERB").analyzed())
            .unwrap();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        let result = seg.analyze(&to_arabic("kataba"), 10).unwrap();
        assert_eq!(result.source, SegmentationSource::Analyzed);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].id, whole.id);
    }

    #[test]
    fn test_unknown_stem_is_registered_once() {
        let lex = MemoryLexicon::new();
        lex.insert(EntrySpec::new(&to_arabic("w")).category("Pref-Wa").pos("CONJ"))
            .unwrap();
        let mut rules = RuleDictionary::default();
        rules.insert(Position::A, "Pref-Wa", Position::C, reserved::NONE).unwrap();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());

        let result = seg.analyze(&to_arabic("wzyd"), 10).unwrap();
        assert_eq!(result.source, SegmentationSource::UnknownStem);
        assert_eq!(result.entries.len(), 1);
        let stems = lex.entries_by_key(&to_arabic("zyd"));
        assert_eq!(stems.len(), 1);
        assert_eq!(stems[0].category().unwrap(), reserved::UNKNOWN);

        // second analysis reuses the registered stem
        seg.analyze(&to_arabic("wzyd"), 10).unwrap();
        assert_eq!(lex.entries_by_key(&to_arabic("zyd")).len(), 1);
        assert_eq!(lex.dynamic_len(), 1);
    }

    #[test]
    fn test_concurrent_analyses_share_dynamic_entries() {
        use std::sync::Barrier;

        const THREADS: usize = 8;
        for _ in 0..50 {
            let lex = MemoryLexicon::new();
            lex.insert(EntrySpec::new(&to_arabic("w")).category("Pref-Wa").pos("CONJ"))
                .unwrap();
            let mut rules = RuleDictionary::default();
            rules.insert(Position::A, "Pref-Wa", Position::C, reserved::NONE).unwrap();
            let seg = Segmenter::new(&rules, &lex, Capacities::default());
            let barrier = Barrier::new(THREADS);

            std::thread::scope(|scope| {
                for _ in 0..THREADS {
                    scope.spawn(|| {
                        barrier.wait();
                        seg.analyze(&to_arabic("wzyd"), 10).unwrap();
                        seg.analyze(&to_arabic("qlm"), 10).unwrap();
                    });
                }
            });

            assert_eq!(lex.entries_by_key(&to_arabic("zyd")).len(), 1);
            assert_eq!(lex.entries_by_key(&to_arabic("qlm")).len(), 1);
            assert_eq!(seg.analyze(&to_arabic("wzyd"), 10).unwrap().entries.len(), 1);
            assert_eq!(lex.dynamic_len(), 2);
        }
    }

    #[test]
    fn test_fallback_whole_word() {
        let lex = MemoryLexicon::new();
        let rules = RuleDictionary::default();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());
        let result = seg.analyze(&to_arabic("qlm"), 10).unwrap();
        assert_eq!(result.source, SegmentationSource::Fallback);
        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].is_leaf());
        assert!(result.entries[0].is_analyzed());
        assert!(matches!(result.warnings[0], Warning::NoSegmentation { .. }));

        // the fabricated entry now short-circuits
        let again = seg.analyze(&to_arabic("qlm"), 10).unwrap();
        assert_eq!(again.source, SegmentationSource::Analyzed);
    }

    #[test]
    fn test_truncation_warns() {
        let (lex, mut rules) = ktb_fixture();
        lex.insert(EntrySpec::new(&to_arabic("t")).category("STEM-2").pos("VERB"))
            .unwrap();
        rules.insert(Position::A, "CONJ", Position::B, "STEM-2").unwrap();
        rules.insert(Position::B, "STEM-2", Position::C, "PRON").unwrap();
        let seg = Segmenter::new(&rules, &lex, Capacities::default());

        let result = seg.analyze(&to_arabic("ktb"), 1).unwrap();
        assert_eq!(result.entries.len(), 1);
        match &result.warnings[0] {
            Warning::Truncated { kept, dropped, .. } => {
                assert_eq!(*kept, 1);
                assert_eq!(dropped.len(), 1);
                assert!(dropped[0].ends_with("/VERB"));
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn test_solution_capacity_is_fatal() {
        let (lex, mut rules) = ktb_fixture();
        lex.insert(EntrySpec::new(&to_arabic("t")).category("STEM-2").pos("VERB"))
            .unwrap();
        rules.insert(Position::A, "CONJ", Position::B, "STEM-2").unwrap();
        rules.insert(Position::B, "STEM-2", Position::C, "PRON").unwrap();
        let caps = Capacities {
            max_solutions: 1,
            ..Default::default()
        };
        let seg = Segmenter::new(&rules, &lex, caps);
        let err = seg.analyze(&to_arabic("ktb"), 10).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Capacity);
    }

    #[test]
    fn test_word_too_large() {
        let (lex, rules) = ktb_fixture();
        let caps = Capacities {
            max_word_chars: 2,
            ..Default::default()
        };
        let seg = Segmenter::new(&rules, &lex, caps);
        assert!(matches!(
            seg.analyze(&to_arabic("ktb"), 10),
            Err(MorphError::InputTooLarge { .. })
        ));
    }
}
