//! Seeding chart: alignment and merging of competing analyses
//!
//! Every analysis of a token is flattened into normalized segments, the
//! segments of all analyses are placed on one shared grid of segment
//! indices, bound clitics are merged into their hosts, every grid boundary
//! is resolved to one document offset shared by all analyses, and
//! identical spans are grouped.
//!
//! All working storage belongs to a single [`SeedingChart::process`] call,
//! so tokens may be processed concurrently.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::buckwalter;
use crate::capacity::Capacities;
use crate::error::{MorphError, Result};
use crate::flatten::flatten;
use crate::lexicon::{EntryId, LexicalEntry, Lexicon, Part};
use crate::located::{LocatedString, Token};
use crate::normalizer::Normalizer;
use crate::symbol::{reserved, Symbol};
use crate::warning::Warning;

mod align;
mod merge;
pub mod merge_rules;
mod offsets;

pub use merge_rules::{MergePatterns, MergeRules};
pub use offsets::offset_equivalent;

/// Pre-merge segment of one analysis
#[derive(Debug, Clone)]
pub struct ChartSegment {
    /// Normalized surface string
    pub surface: String,
    pub part: Part,
    /// Character span within the (padded) analysis
    pub char_start: usize,
    pub char_end: usize,
    /// Span on the shared segment grid
    pub seg_start: usize,
    pub seg_end: usize,
    pub entry: Arc<LexicalEntry>,
}

/// Segments of one analysis before merging
#[derive(Debug, Clone)]
pub struct AnalysisRow {
    pub analysis: Arc<LexicalEntry>,
    pub retokenized: bool,
    pub segments: Vec<ChartSegment>,
    /// Total normalized length before padding
    pub char_len: usize,
}

/// A segment after clitics have been merged into it
#[derive(Debug, Clone, Serialize)]
pub struct MergedUnit {
    pub surface: String,
    pub seg_start: usize,
    pub seg_end: usize,
    /// Document offsets, half-open
    pub start: usize,
    pub end: usize,
    pub part: Part,
    pub category: Symbol,
    pub part_of_speech: Symbol,
    #[serde(serialize_with = "serialize_entry_ids")]
    pub entries: Vec<Arc<LexicalEntry>>,
}

fn serialize_entry_ids<S: serde::Serializer>(
    entries: &[Arc<LexicalEntry>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(entries.iter().map(|e| e.id))
}

/// Merged units of one analysis
#[derive(Debug, Clone, Serialize)]
pub struct MergedAnalysis {
    /// Position of the analysis in the token's analysis list
    pub index: usize,
    pub units: Vec<MergedUnit>,
}

/// A distinct span and surface with every tag seen for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedSegment {
    pub start: usize,
    pub end: usize,
    pub surface: String,
    pub pos_tags: BTreeSet<Symbol>,
    pub entries: Vec<EntryId>,
}

/// Everything the seeding chart produced for one token
#[derive(Debug, Clone, Serialize)]
pub struct TokenChart {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub analyses: Vec<MergedAnalysis>,
    pub groups: Vec<GroupedSegment>,
    pub warnings: Vec<Warning>,
}

impl TokenChart {
    /// Human-readable rendering for debugging
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "token '{}' [{}, {}) ({})",
            self.text,
            self.start,
            self.end,
            buckwalter::to_buckwalter(&self.text)
        );
        for analysis in &self.analyses {
            let _ = write!(out, "  #{}:", analysis.index);
            for unit in &analysis.units {
                let _ = write!(
                    out,
                    " {}[{},{})@{}-{}/{}",
                    buckwalter::to_buckwalter(&unit.surface),
                    unit.start,
                    unit.end,
                    unit.seg_start,
                    unit.seg_end,
                    unit.part_of_speech
                );
            }
            out.push('\n');
        }
        for group in &self.groups {
            let tags: Vec<&str> = group.pos_tags.iter().map(Symbol::as_str).collect();
            let _ = writeln!(
                out,
                "  group [{}, {}) {} {{{}}}",
                group.start,
                group.end,
                buckwalter::to_buckwalter(&group.surface),
                tags.join(", ")
            );
        }
        out
    }
}

/// Aligner/merger bound to a lexicon and merge rules
pub struct SeedingChart<'a> {
    lexicon: &'a dyn Lexicon,
    merge_rules: &'a MergeRules,
    caps: Capacities,
    normalizer: Normalizer,
}

impl<'a> SeedingChart<'a> {
    pub fn new(lexicon: &'a dyn Lexicon, merge_rules: &'a MergeRules, caps: Capacities) -> Self {
        Self {
            lexicon,
            merge_rules,
            caps,
            normalizer: Normalizer::with_max_len(caps.max_word_chars),
        }
    }

    /// Align, merge, place and group the analyses of `token`
    pub fn process(&self, token: &Token, sentence: &LocatedString) -> Result<TokenChart> {
        let text = token.text(sentence);
        let (start, end) = token.offsets(sentence);
        let mut warnings = Vec::new();

        let mut rows = self.populate(token, &text)?;
        align::align(&mut rows);

        let mut analyses = Vec::with_capacity(rows.len());
        let mut walks = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let units = merge::merge_row(row, self.merge_rules, self.caps.max_merge_chars)?;
            walks.push(offsets::walk_units(&units, token, sentence, index, &mut warnings));
            analyses.push(MergedAnalysis { index, units });
        }
        offsets::place(&mut analyses, &walks, token, sentence);

        let groups = group(&analyses);
        Ok(TokenChart {
            text,
            start,
            end,
            analyses,
            groups,
            warnings,
        })
    }

    /// Flatten and normalize every analysis of the token
    fn populate(&self, token: &Token, text: &str) -> Result<Vec<AnalysisRow>> {
        if token.analyses.len() > self.caps.max_analyses {
            return Err(MorphError::capacity("analyses per token", self.caps.max_analyses));
        }

        let mut rows = Vec::with_capacity(token.analyses.len());
        for analysis in &token.analyses {
            let retokenized = analysis
                .category()
                .is_some_and(|c| c == reserved::RETOKENIZED);
            let leaves = flatten(self.lexicon, analysis, self.caps.max_flattened)?;

            let mut segments = Vec::with_capacity(leaves.len());
            let mut cursor = 0;
            for leaf in leaves {
                let features = leaf.entry.require_features()?;
                let surface = if leaf.entry.is_canned() {
                    self.normalizer.normalize(text)?
                } else {
                    let display = if features.is_categorized() && !features.voweled.is_none() {
                        features.voweled.as_str()
                    } else {
                        leaf.entry.key.as_str()
                    };
                    self.normalizer
                        .normalize_against(display, leaf.entry.key.as_str())?
                };
                if surface.is_empty() || surface == reserved::NONE {
                    continue;
                }
                let len = surface.chars().count();
                segments.push(ChartSegment {
                    surface,
                    part: if retokenized { Part::Retokenized } else { leaf.part },
                    char_start: cursor,
                    char_end: cursor + len,
                    seg_start: 0,
                    seg_end: 0,
                    entry: leaf.entry,
                });
                cursor += len;
            }

            rows.push(AnalysisRow {
                analysis: analysis.clone(),
                retokenized,
                segments,
                char_len: cursor,
            });
        }
        Ok(rows)
    }
}

/// Deduplicate merged units by (start, end, surface)
fn group(analyses: &[MergedAnalysis]) -> Vec<GroupedSegment> {
    let mut groups: BTreeMap<(usize, usize, String), GroupedSegment> = BTreeMap::new();
    for unit in analyses.iter().flat_map(|a| &a.units) {
        let group = groups
            .entry((unit.start, unit.end, unit.surface.clone()))
            .or_insert_with(|| GroupedSegment {
                start: unit.start,
                end: unit.end,
                surface: unit.surface.clone(),
                pos_tags: BTreeSet::new(),
                entries: Vec::new(),
            });
        group.pos_tags.insert(unit.part_of_speech.clone());
        for entry in &unit.entries {
            if !group.entries.contains(&entry.id) {
                group.entries.push(entry.id);
            }
        }
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckwalter::to_arabic;
    use crate::lexicon::{EntrySpec, MemoryLexicon};

    fn composite(lex: &MemoryLexicon, word: &str, parts: &[(Part, &str, &str)]) -> Arc<LexicalEntry> {
        let mut spec = EntrySpec::new(&to_arabic(word)).category(reserved::SEGMENTED);
        for (part, key, pos) in parts {
            spec = spec.segment(*part, EntrySpec::new(&to_arabic(key)).category(pos).pos(pos));
        }
        lex.insert(spec).unwrap()
    }

    fn process(lex: &MemoryLexicon, text: &str, analyses: Vec<Arc<LexicalEntry>>) -> TokenChart {
        let sentence = LocatedString::new(text);
        let token = Token::new(0, sentence.len(), analyses);
        let rules = MergeRules::default();
        SeedingChart::new(lex, &rules, Capacities::default())
            .process(&token, &sentence)
            .unwrap()
    }

    #[test]
    fn test_prefix_stays_suffix_merges() {
        let lex = MemoryLexicon::new();
        let a = composite(
            &lex,
            "ktb",
            &[(Part::Prefix, "k", "CONJ"), (Part::Stem, "t", "NOUN"), (Part::Suffix, "b", "PRON")],
        );
        let chart = process(&lex, &to_arabic("ktb"), vec![a]);

        assert_eq!(chart.analyses[0].units.len(), 2);
        assert_eq!(chart.groups.len(), 2);
        assert_eq!(chart.groups[0].surface, to_arabic("k"));
        assert_eq!((chart.groups[0].start, chart.groups[0].end), (0, 1));
        assert_eq!(chart.groups[1].surface, to_arabic("tb"));
        assert_eq!((chart.groups[1].start, chart.groups[1].end), (1, 3));
        assert!(chart.groups[1].pos_tags.contains("NOUN"));
        assert_eq!(chart.groups[1].entries.len(), 2);
        assert!(chart.warnings.is_empty());
    }

    #[test]
    fn test_identical_spans_group_tags() {
        let lex = MemoryLexicon::new();
        let a = composite(&lex, "wktb", &[(Part::Prefix, "w", "CONJ"), (Part::Stem, "ktb", "VERB")]);
        let b = composite(&lex, "wktb", &[(Part::Prefix, "w", "CONJ"), (Part::Stem, "ktb", "NOUN")]);
        let chart = process(&lex, &to_arabic("wktb"), vec![a, b]);

        assert_eq!(chart.groups.len(), 2);
        let stem = &chart.groups[1];
        let tags: Vec<&str> = stem.pos_tags.iter().map(Symbol::as_str).collect();
        assert_eq!(tags, vec!["NOUN", "VERB"]);
        assert_eq!(chart.groups[0].pos_tags.len(), 1);
    }

    #[test]
    fn test_single_unit_uses_token_offsets() {
        let lex = MemoryLexicon::new();
        let e = lex
            .insert(EntrySpec::new(&to_arabic("ktAb")).category("N").pos("NOUN").voweled(&to_arabic("kitAbN")))
            .unwrap();
        let sentence = LocatedString::with_base(&format!("xx {}", to_arabic("kitAbN")), 100);
        let token = Token::new(3, sentence.len(), vec![e]);
        let rules = MergeRules::default();
        let chart = SeedingChart::new(&lex, &rules, Capacities::default())
            .process(&token, &sentence)
            .unwrap();

        assert_eq!(chart.groups.len(), 1);
        assert_eq!(chart.groups[0].surface, to_arabic("ktAb"));
        assert_eq!((chart.groups[0].start, chart.groups[0].end), (103, 109));
    }

    #[test]
    fn test_retokenized_analysis_collapses() {
        let lex = MemoryLexicon::new();
        let spec = EntrySpec::new(&to_arabic("wktb"))
            .category(reserved::RETOKENIZED)
            .pos("VERB")
            .segment(Part::Prefix, EntrySpec::new(&to_arabic("w")).category("CONJ").pos("CONJ"))
            .segment(Part::Stem, EntrySpec::new(&to_arabic("ktb")).category("PV").pos("VERB"));
        let e = lex.insert(spec).unwrap();
        let chart = process(&lex, &to_arabic("wktb"), vec![e]);

        let units = &chart.analyses[0].units;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].part, Part::Stem);
        assert_eq!(units[0].surface, to_arabic("wktb"));
        assert_eq!(units[0].entries.len(), 2);
    }

    #[test]
    fn test_canned_entry_uses_token_text() {
        let lex = MemoryLexicon::new();
        let canned = lex.entries_by_key(reserved::NON_ARABIC);
        let chart = process(&lex, "2024", canned);
        assert_eq!(chart.groups.len(), 1);
        assert_eq!(chart.groups[0].surface, "2024");
        assert_eq!((chart.groups[0].start, chart.groups[0].end), (0, 4));
    }

    #[test]
    fn test_too_many_analyses() {
        let lex = MemoryLexicon::new();
        let e = composite(&lex, "k", &[(Part::Stem, "k", "NOUN")]);
        let sentence = LocatedString::new(&to_arabic("k"));
        let token = Token::new(0, 1, vec![e.clone(), e.clone(), e]);
        let rules = MergeRules::default();
        let caps = Capacities {
            max_analyses: 2,
            ..Default::default()
        };
        let err = SeedingChart::new(&lex, &rules, caps)
            .process(&token, &sentence)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Capacity);
    }

    #[test]
    fn test_missing_features_is_inconsistent() {
        let lex = MemoryLexicon::new();
        let bare = Arc::new(LexicalEntry {
            id: lex.next_id(),
            key: lex.intern("x"),
            features: None,
            segments: Vec::new(),
        });
        let sentence = LocatedString::new("x");
        let token = Token::new(0, 1, vec![bare]);
        let rules = MergeRules::default();
        let err = SeedingChart::new(&lex, &rules, Capacities::default())
            .process(&token, &sentence)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Internal);
    }

    #[test]
    fn test_dump_mentions_groups() {
        let lex = MemoryLexicon::new();
        let a = composite(&lex, "ktb", &[(Part::Prefix, "k", "CONJ"), (Part::Stem, "tb", "NOUN")]);
        let chart = process(&lex, &to_arabic("ktb"), vec![a]);
        let dump = chart.dump();
        assert!(dump.contains("(ktb)"));
        assert!(dump.contains("group [1, 3) tb {NOUN}"));
    }
}
