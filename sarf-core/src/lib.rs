//! Arabic morphological segmentation and seeding-chart alignment
//!
//! This crate turns a raw Arabic token into parser-ready morphological
//! segments with document offsets. It never owns lexical data: a
//! [`Lexicon`] is queried by key and a [`RuleDictionary`] decides which
//! prefix/stem/suffix combinations are legal.
//!
//! # Pipeline
//!
//! - **Normalizer**: strips diacritics, resolves letter variants against a reference
//! - **Segmenter**: enumerates every split, keeps the legal ones
//! - **Flattener**: expands composite entries into leaves
//! - **SeedingChart**: aligns competing analyses, merges clitics, assigns
//!   offsets, groups identical spans
//!
//! # Example
//!
//! ```rust
//! use sarf_core::{
//!     buckwalter::to_arabic, Capacities, EntrySpec, LocatedString, MemoryLexicon,
//!     MergeRules, RuleDictionary, SeedingChart, Segmenter, Token,
//! };
//!
//! let lexicon = MemoryLexicon::new();
//! lexicon.insert(EntrySpec::new(&to_arabic("w")).category("Pref-Wa").pos("CONJ")).unwrap();
//! lexicon.insert(EntrySpec::new(&to_arabic("ktb")).category("PV").pos("VERB")).unwrap();
//!
//! let mut rules = RuleDictionary::default();
//! rules.insert("A".parse().unwrap(), "Pref-Wa", "B".parse().unwrap(), "PV").unwrap();
//! rules.insert("B".parse().unwrap(), "PV", "C".parse().unwrap(), "-NONE-").unwrap();
//! rules.insert("A".parse().unwrap(), "Pref-Wa", "C".parse().unwrap(), "-NONE-").unwrap();
//!
//! let caps = Capacities::default();
//! let word = to_arabic("wktb");
//! let segmentation = Segmenter::new(&rules, &lexicon, caps).analyze(&word, 10).unwrap();
//!
//! let sentence = LocatedString::new(&word);
//! let token = Token::new(0, sentence.len(), segmentation.entries);
//! let merge_rules = MergeRules::default();
//! let chart = SeedingChart::new(&lexicon, &merge_rules, caps)
//!     .process(&token, &sentence)
//!     .unwrap();
//!
//! assert_eq!(chart.groups.len(), 2);
//! assert_eq!(chart.groups[1].surface, to_arabic("ktb"));
//! assert_eq!((chart.groups[1].start, chart.groups[1].end), (1, 4));
//! ```

pub mod buckwalter;
pub mod capacity;
pub mod chart;
pub mod error;
pub mod flatten;
pub mod lexicon;
pub mod located;
pub mod normalizer;
pub mod rules;
pub mod segmentation;
pub mod symbol;
pub mod warning;

pub use capacity::Capacities;
pub use chart::{
    GroupedSegment, MergePatterns, MergeRules, MergedAnalysis, MergedUnit, SeedingChart,
    TokenChart,
};
pub use error::{ErrorKind, MorphError, Result};
pub use flatten::{flatten, Leaf};
pub use lexicon::{
    Encoding, EntryId, EntrySpec, FeatureBundle, LexicalEntry, Lexicon, MemoryLexicon, Part,
    SegmentRef,
};
pub use located::{LocatedString, Token};
pub use normalizer::Normalizer;
pub use rules::{PairKind, Position, RuleDictionary};
pub use segmentation::{Segmentation, SegmentationChart, SegmentationSource, Segmenter, Solution, Split};
pub use symbol::{reserved, Symbol, SymbolTable};
pub use warning::Warning;
