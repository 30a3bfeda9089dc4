//! Mapping merged units back to document offsets
//!
//! The original token text and each unit's normalized surface are walked in
//! lockstep. The walk tolerates diacritics in the original, a small set of
//! letter variants, and a single skipped character on either side. Walked
//! positions are then attached to the shared segment grid, so analyses that
//! agree on a boundary agree on its offset.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::located::{LocatedString, Token};
use crate::normalizer::is_non_key;
use crate::warning::Warning;

use super::{MergedAnalysis, MergedUnit};

/// Letter pairs treated as the same letter when placing offsets
const VARIANTS: &[(char, char)] = &[
    ('\u{0622}', '\u{0627}'), // alef madda / alef
    ('\u{0623}', '\u{0627}'), // alef hamza above / alef
    ('\u{0625}', '\u{0627}'), // alef hamza below / alef
    ('\u{0671}', '\u{0627}'), // alef wasla / alef
    ('\u{0621}', '\u{0623}'), // hamza / alef hamza above
    ('\u{0621}', '\u{0625}'), // hamza / alef hamza below
    ('\u{0629}', '\u{062A}'), // ta marbuta / ta
    ('\u{0649}', '\u{064A}'), // alef maqsura / ya
];

/// Symmetric letter equivalence used by the offset walk
///
/// Narrower than the normalizer's equivalence groups.
pub fn offset_equivalent(a: char, b: char) -> bool {
    a == b
        || VARIANTS
            .iter()
            .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
}

/// Consume the original characters matching `surface`, starting at `pos`
///
/// Returns the position just past the consumed range.
fn walk(original: &[char], mut pos: usize, surface: &[char]) -> usize {
    let mut j = 0;
    while j < surface.len() && pos < original.len() {
        let o = original[pos];
        if offset_equivalent(o, surface[j]) {
            pos += 1;
            j += 1;
        } else if is_non_key(o) {
            pos += 1;
        } else if pos + 1 < original.len() && offset_equivalent(original[pos + 1], surface[j]) {
            pos += 2;
            j += 1;
        } else if j + 1 < surface.len() && offset_equivalent(o, surface[j + 1]) {
            pos += 1;
            j += 2;
        } else {
            pos += 1;
            j += 1;
        }
    }
    // trailing diacritics belong to the unit just walked
    while pos < original.len() && is_non_key(original[pos]) {
        pos += 1;
    }
    pos
}

/// Walked token-relative character ranges of one analysis's units
#[derive(Debug, Clone)]
pub(super) struct Walk {
    pub ranges: Vec<(usize, usize)>,
    /// No borrowing or end correction was needed
    pub clean: bool,
}

/// Walk the token text against the surfaces of one analysis
pub(super) fn walk_units(
    units: &[MergedUnit],
    token: &Token,
    sentence: &LocatedString,
    analysis: usize,
    warnings: &mut Vec<Warning>,
) -> Walk {
    let original = sentence.chars(token.start, token.end);
    if units.len() <= 1 {
        return Walk {
            ranges: units.iter().map(|_| (0, original.len())).collect(),
            clean: true,
        };
    }

    let token_text: String = original.iter().collect();
    let warned = warnings.len();

    let mut ranges: Vec<(usize, usize)> = Vec::with_capacity(units.len());
    let mut pos = 0;
    for unit in units {
        let surface: Vec<char> = unit.surface.chars().collect();
        let begin = pos;
        pos = walk(original, pos, &surface);

        if pos == begin {
            if let Some(prev) = ranges.last_mut() {
                let prev_len = prev.1 - prev.0;
                let borrowed = surface.len().min(prev_len.saturating_sub(1));
                if borrowed > 0 {
                    prev.1 -= borrowed;
                    let start = prev.1;
                    warn!(
                        "segment '{}' of '{}' has no text left, borrowing {} chars",
                        unit.surface, token_text, borrowed
                    );
                    warnings.push(Warning::BorrowedOffsets {
                        token: token_text.clone(),
                        surface: unit.surface.clone(),
                        borrowed,
                    });
                    ranges.push((start, begin));
                    continue;
                }
            }
            debug!("segment '{}' of '{}' is empty", unit.surface, token_text);
        }
        ranges.push((begin, pos));
    }

    if let Some(last) = ranges.last_mut() {
        if last.1 != original.len() {
            let walked_end = sentence.span_offsets(token.start + last.0, token.start + last.1).1;
            let expected_end = token.offsets(sentence).1;
            warn!(
                "analysis {} of '{}': walked end {} != token end {}, correcting",
                analysis, token_text, walked_end, expected_end
            );
            warnings.push(Warning::EndOffsetCorrected {
                token: token_text.clone(),
                analysis,
                walked_end,
                expected_end,
            });
            last.1 = original.len();
            last.0 = last.0.min(last.1);
        }
    }

    Walk {
        ranges,
        clean: warnings.len() == warned,
    }
}

/// Resolve every grid boundary to one character position and set the
/// document offsets of every unit from it
///
/// `walks[i]` belongs to `analyses[i]`. A boundary takes the position of
/// the first clean walk reaching it, else of the first walk of any kind.
/// Positions never decrease along the grid.
pub(super) fn place(
    analyses: &mut [MergedAnalysis],
    walks: &[Walk],
    token: &Token,
    sentence: &LocatedString,
) {
    let len = token.len();

    let mut order: Vec<usize> = (0..walks.len().min(analyses.len())).collect();
    order.sort_by_key(|&i| (!walks[i].clean, i));

    let mut resolved: BTreeMap<usize, usize> = BTreeMap::new();
    for i in order {
        for (unit, &(s, e)) in analyses[i].units.iter().zip(&walks[i].ranges) {
            resolved.entry(unit.seg_start).or_insert(s);
            resolved.entry(unit.seg_end).or_insert(e);
        }
    }

    let mut floor = 0;
    for pos in resolved.values_mut() {
        floor = floor.max((*pos).min(len));
        *pos = floor;
    }

    for unit in analyses.iter_mut().flat_map(|a| a.units.iter_mut()) {
        let s = resolved.get(&unit.seg_start).copied().unwrap_or(0);
        let e = resolved.get(&unit.seg_end).copied().unwrap_or(len).max(s);
        let (start, end) = sentence.span_offsets(token.start + s, token.start + e);
        unit.start = start;
        unit.end = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckwalter::to_arabic;
    use crate::lexicon::Part;
    use crate::symbol::Symbol;

    fn units(surfaces: &[&str]) -> Vec<MergedUnit> {
        surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| MergedUnit {
                surface: to_arabic(s),
                seg_start: i,
                seg_end: i + 1,
                start: 0,
                end: 0,
                part: Part::Stem,
                category: Symbol::new("N"),
                part_of_speech: Symbol::new("NOUN"),
                entries: Vec::new(),
            })
            .collect()
    }

    fn run(text: &str, base: usize, surfaces: &[&str]) -> (Vec<(usize, usize)>, Vec<Warning>) {
        let sentence = LocatedString::with_base(&to_arabic(text), base);
        let token = Token::new(0, sentence.len(), Vec::new());
        let mut analyses = vec![MergedAnalysis {
            index: 0,
            units: units(surfaces),
        }];
        let mut warnings = Vec::new();
        let walk = walk_units(&analyses[0].units, &token, &sentence, 0, &mut warnings);
        place(&mut analyses, &[walk], &token, &sentence);
        (spans(&analyses[0]), warnings)
    }

    fn spans(analysis: &MergedAnalysis) -> Vec<(usize, usize)> {
        analysis.units.iter().map(|u| (u.start, u.end)).collect()
    }

    #[test]
    fn test_equivalence_table() {
        assert!(offset_equivalent('\u{0623}', '\u{0627}'));
        assert!(offset_equivalent('\u{0627}', '\u{0625}'));
        assert!(offset_equivalent('\u{0629}', '\u{062A}'));
        assert!(!offset_equivalent('\u{0647}', '\u{0629}'));
        assert!(offset_equivalent('x', 'x'));
    }

    #[test]
    fn test_plain_tiling() {
        let (spans, warnings) = run("ktb", 10, &["k", "tb"]);
        assert_eq!(spans, vec![(10, 11), (11, 13)]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_diacritics_follow_their_letter() {
        let (spans, warnings) = run("kataba", 0, &["k", "tb"]);
        assert_eq!(spans, vec![(0, 2), (2, 6)]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_hamza_variant_matches() {
        // >kl written with alef hamza, unit normalized to bare alef
        let (spans, _) = run(">kl", 0, &["A", "kl"]);
        assert_eq!(spans, vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn test_exhausted_unit_borrows() {
        let (spans, warnings) = run("ktb", 0, &["ktb", "h"]);
        assert_eq!(spans, vec![(0, 2), (2, 3)]);
        assert!(matches!(warnings[0], Warning::BorrowedOffsets { borrowed: 1, .. }));
    }

    #[test]
    fn test_short_walk_end_corrected() {
        let (spans, warnings) = run("ktbw", 5, &["k", "tb"]);
        assert_eq!(spans, vec![(5, 6), (6, 9)]);
        assert_eq!(
            warnings,
            vec![Warning::EndOffsetCorrected {
                token: to_arabic("ktbw"),
                analysis: 0,
                walked_end: 8,
                expected_end: 9,
            }]
        );
    }

    #[test]
    fn test_single_unit_takes_token_span() {
        let (spans, warnings) = run("wktb", 3, &["ktb"]);
        assert_eq!(spans, vec![(3, 7)]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_shared_boundary_resolves_once() {
        // the second analysis keeps the long vowel in its first unit, so
        // its own walk overshoots the boundary both analyses share
        let sentence = LocatedString::new(&to_arabic("kitAb"));
        let token = Token::new(0, sentence.len(), Vec::new());
        let mut analyses = vec![
            MergedAnalysis {
                index: 0,
                units: units(&["k", "tAb"]),
            },
            MergedAnalysis {
                index: 1,
                units: units(&["kA", "tb"]),
            },
        ];
        let mut warnings = Vec::new();
        let walks: Vec<Walk> = analyses
            .iter()
            .map(|a| walk_units(&a.units, &token, &sentence, a.index, &mut warnings))
            .collect();
        assert_eq!(walks[0].ranges, vec![(0, 2), (2, 5)]);
        assert_eq!(walks[1].ranges, vec![(0, 4), (4, 5)]);

        place(&mut analyses, &walks, &token, &sentence);
        assert_eq!(spans(&analyses[0]), vec![(0, 2), (2, 5)]);
        assert_eq!(spans(&analyses[1]), spans(&analyses[0]));
    }

    #[test]
    fn test_clean_walk_wins_boundary() {
        let sentence = LocatedString::new(&to_arabic("ktbw"));
        let token = Token::new(0, sentence.len(), Vec::new());
        // the first analysis needs an end correction, the second does not
        let mut analyses = vec![
            MergedAnalysis {
                index: 0,
                units: units(&["k", "tb"]),
            },
            MergedAnalysis {
                index: 1,
                units: units(&["kt", "bw"]),
            },
        ];
        let mut warnings = Vec::new();
        let walks: Vec<Walk> = analyses
            .iter()
            .map(|a| walk_units(&a.units, &token, &sentence, a.index, &mut warnings))
            .collect();
        assert!(!walks[0].clean);
        assert!(walks[1].clean);

        place(&mut analyses, &walks, &token, &sentence);
        assert_eq!(spans(&analyses[0]), vec![(0, 2), (2, 4)]);
        assert_eq!(spans(&analyses[1]), vec![(0, 2), (2, 4)]);
    }
}
