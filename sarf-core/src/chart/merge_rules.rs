//! Part-of-speech patterns deciding which segments are bound clitics
//!
//! A prefix inflection fuses forward onto the next segment; a suffix
//! inflection fuses backward onto the previous merged unit. Patterns are
//! regular expressions matched against the segment's part-of-speech tag.

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};
use crate::lexicon::Part;
use crate::symbol::reserved;

/// Pattern lists, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePatterns {
    /// Prefix inflections for segments not tagged PREFIX
    pub prefix_inflections: Vec<String>,
    /// Prefix inflections for segments tagged PREFIX
    pub prefixed_inflections: Vec<String>,
    /// Suffix inflections for ordinary SUFFIX segments
    pub suffix_inflections: Vec<String>,
    /// Suffix inflections for segments whose category is ADDED
    pub added_suffix_inflections: Vec<String>,
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for MergePatterns {
    fn default() -> Self {
        Self {
            // future particle, determiner, imperfective person prefixes
            prefix_inflections: owned(&["^FUT(_PART)?$", "^DET$", "^IV[123][MFSDP]*$"]),
            // subordinating conjunction, subjunctive/jussive and other bound particles
            prefixed_inflections: owned(&[
                "^SUB_CONJ$",
                "^SUBJUNC$",
                "^(JUS|RC|EMPHATIC|FUT)_PART$",
                "^DET$",
            ]),
            // subject, object, possessive and pronoun suffixes
            suffix_inflections: owned(&[
                "^(PV|IV|CV)SUFF",
                "^NSUFF",
                "^POSS_PRON",
                "^PRON",
                "_(SUBJ|DO)",
                "^CASE_",
            ]),
            added_suffix_inflections: owned(&["^(PV|IV|CV)SUFF_SUBJ", "^NSUFF", "^CASE_"]),
        }
    }
}

/// Compiled merge rules
#[derive(Debug, Clone)]
pub struct MergeRules {
    prefix: RegexSet,
    prefixed: RegexSet,
    suffix: RegexSet,
    added_suffix: RegexSet,
}

impl Default for MergeRules {
    fn default() -> Self {
        Self::from_patterns(&MergePatterns::default())
            .expect("built-in merge patterns must compile")
    }
}

fn compile(name: &str, patterns: &[String]) -> Result<RegexSet> {
    RegexSet::new(patterns)
        .map_err(|e| MorphError::MalformedInput(format!("bad {name} pattern: {e}")))
}

impl MergeRules {
    /// Compile configured patterns
    pub fn from_patterns(patterns: &MergePatterns) -> Result<Self> {
        Ok(Self {
            prefix: compile("prefix_inflections", &patterns.prefix_inflections)?,
            prefixed: compile("prefixed_inflections", &patterns.prefixed_inflections)?,
            suffix: compile("suffix_inflections", &patterns.suffix_inflections)?,
            added_suffix: compile("added_suffix_inflections", &patterns.added_suffix_inflections)?,
        })
    }

    /// Rules that never merge anything
    pub fn empty() -> Self {
        Self {
            prefix: RegexSet::empty(),
            prefixed: RegexSet::empty(),
            suffix: RegexSet::empty(),
            added_suffix: RegexSet::empty(),
        }
    }

    /// Does a segment fuse forward onto its host?
    pub fn is_prefix_inflection(&self, part: Part, pos: &str) -> bool {
        match part {
            Part::Prefix => self.prefixed.is_match(pos),
            Part::Retokenized => false,
            Part::Stem | Part::Suffix => self.prefix.is_match(pos),
        }
    }

    /// Does a segment fuse backward onto the previous unit?
    pub fn is_suffix_inflection(&self, part: Part, category: &str, pos: &str) -> bool {
        if category == reserved::ADDED {
            return self.added_suffix.is_match(pos);
        }
        part == Part::Suffix && self.suffix.is_match(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix_inflections() {
        let rules = MergeRules::default();
        assert!(rules.is_prefix_inflection(Part::Stem, "FUT"));
        assert!(rules.is_prefix_inflection(Part::Stem, "DET"));
        assert!(rules.is_prefix_inflection(Part::Stem, "IV3MS"));
        assert!(!rules.is_prefix_inflection(Part::Stem, "IV"));
        assert!(!rules.is_prefix_inflection(Part::Stem, "NOUN"));

        assert!(rules.is_prefix_inflection(Part::Prefix, "SUB_CONJ"));
        assert!(rules.is_prefix_inflection(Part::Prefix, "JUS_PART"));
        assert!(!rules.is_prefix_inflection(Part::Prefix, "CONJ"));
        assert!(!rules.is_prefix_inflection(Part::Prefix, "PREP"));
        assert!(!rules.is_prefix_inflection(Part::Retokenized, "DET"));
    }

    #[test]
    fn test_default_suffix_inflections() {
        let rules = MergeRules::default();
        assert!(rules.is_suffix_inflection(Part::Suffix, "N", "PRON"));
        assert!(rules.is_suffix_inflection(Part::Suffix, "N", "POSS_PRON_3MS"));
        assert!(rules.is_suffix_inflection(Part::Suffix, "N", "PVSUFF_SUBJ:3MS"));
        assert!(rules.is_suffix_inflection(Part::Suffix, "N", "IVSUFF_DO:1S"));
        // a pronoun stem is not a clitic
        assert!(!rules.is_suffix_inflection(Part::Stem, "N", "PRON_3MS"));
    }

    #[test]
    fn test_added_category_uses_narrow_set() {
        let rules = MergeRules::default();
        assert!(rules.is_suffix_inflection(Part::Stem, reserved::ADDED, "PVSUFF_SUBJ:3FS"));
        assert!(!rules.is_suffix_inflection(Part::Suffix, reserved::ADDED, "POSS_PRON_3MS"));
    }

    #[test]
    fn test_default_patterns_compile() {
        assert!(MergeRules::from_patterns(&MergePatterns::default()).is_ok());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let patterns = MergePatterns {
            suffix_inflections: vec!["(".to_string()],
            ..Default::default()
        };
        let err = MergeRules::from_patterns(&patterns).unwrap_err();
        assert!(err.to_string().contains("suffix_inflections"));
    }

    #[test]
    fn test_empty_rules_never_merge() {
        let rules = MergeRules::empty();
        assert!(!rules.is_prefix_inflection(Part::Stem, "DET"));
        assert!(!rules.is_suffix_inflection(Part::Suffix, "N", "PRON"));
    }
}
