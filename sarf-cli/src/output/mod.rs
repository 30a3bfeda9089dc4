//! Output formatting module

use anyhow::Result;
use sarf_engine::SentenceAnalysis;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output one analyzed sentence read from `source`
    fn format_sentence(&mut self, source: &str, sentence: &SentenceAnalysis) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;
