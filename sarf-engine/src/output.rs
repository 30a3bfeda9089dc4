//! Serializable analysis results

use sarf_core::{buckwalter, GroupedSegment, TokenChart, Warning};
use serde::Serialize;

/// One grouped segment of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentOutput {
    /// Document start offset
    pub start: usize,
    /// Document end offset (exclusive)
    pub end: usize,
    /// Normalized surface form
    pub surface: String,
    /// Surface form in BuckWalter transliteration
    pub buckwalter: String,
    /// Every part-of-speech tag seen for this span, sorted
    pub pos: Vec<String>,
    /// Lexicon entries contributing to this span
    pub entries: Vec<u32>,
}

impl From<&GroupedSegment> for SegmentOutput {
    fn from(group: &GroupedSegment) -> Self {
        Self {
            start: group.start,
            end: group.end,
            surface: group.surface.clone(),
            buckwalter: buckwalter::to_buckwalter(&group.surface),
            pos: group.pos_tags.iter().map(|t| t.to_string()).collect(),
            entries: group.entries.iter().map(|id| id.0).collect(),
        }
    }
}

/// Analysis of one token
#[derive(Debug, Clone, Serialize)]
pub struct TokenAnalysis {
    /// Token text as it appears in the document
    pub text: String,
    /// Document start offset
    pub start: usize,
    /// Document end offset (exclusive)
    pub end: usize,
    /// Number of competing analyses
    pub analyses: usize,
    /// Grouped segments ordered by span
    pub segments: Vec<SegmentOutput>,
    /// Recoverable conditions met while analyzing the token
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl TokenAnalysis {
    /// Build from a seeding chart, prepending segmentation warnings
    pub fn from_chart(chart: TokenChart, mut warnings: Vec<Warning>) -> Self {
        warnings.extend(chart.warnings);
        Self {
            segments: chart.groups.iter().map(SegmentOutput::from).collect(),
            analyses: chart.analyses.len(),
            text: chart.text,
            start: chart.start,
            end: chart.end,
            warnings,
        }
    }
}

/// Analysis of one sentence
#[derive(Debug, Clone, Serialize)]
pub struct SentenceAnalysis {
    /// Sentence text
    pub text: String,
    /// Document offset of the first character
    pub start: usize,
    /// Document offset past the last character
    pub end: usize,
    /// Analyzed tokens in order
    pub tokens: Vec<TokenAnalysis>,
}

impl SentenceAnalysis {
    /// All warnings of all tokens
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.tokens.iter().flat_map(|t| t.warnings.iter())
    }

    /// Total number of grouped segments
    pub fn segment_count(&self) -> usize {
        self.tokens.iter().map(|t| t.segments.len()).sum()
    }
}
