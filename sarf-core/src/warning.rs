//! Recoverable conditions
//!
//! These never abort an analysis. Each one is logged at `warn` level where
//! it happens and also returned to the caller.

use serde::Serialize;
use std::fmt;

/// Something worth knowing that did not stop the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// More analyses were found than requested
    Truncated {
        word: String,
        kept: usize,
        dropped: Vec<String>,
    },
    /// No segmentation was legal; a whole-word entry was fabricated
    NoSegmentation { word: String },
    /// The offset walk ended away from the token end and was corrected
    ///
    /// The walk is a known approximation on malformed input.
    EndOffsetCorrected {
        token: String,
        analysis: usize,
        walked_end: usize,
        expected_end: usize,
    },
    /// A segment with no original text left borrowed from its predecessor
    BorrowedOffsets {
        token: String,
        surface: String,
        borrowed: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Truncated { word, kept, dropped } => write!(
                f,
                "kept {kept} analyses of '{word}', dropped {}: {}",
                dropped.len(),
                dropped.join(" | ")
            ),
            Warning::NoSegmentation { word } => {
                write!(f, "no legal segmentation for '{word}', using whole word")
            }
            Warning::EndOffsetCorrected {
                token,
                analysis,
                walked_end,
                expected_end,
            } => write!(
                f,
                "analysis {analysis} of '{token}' ended at {walked_end}, corrected to {expected_end}"
            ),
            Warning::BorrowedOffsets {
                token,
                surface,
                borrowed,
            } => write!(
                f,
                "segment '{surface}' of '{token}' borrowed {borrowed} chars from its predecessor"
            ),
        }
    }
}
