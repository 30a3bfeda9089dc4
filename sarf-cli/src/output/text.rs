//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use sarf_engine::SentenceAnalysis;
use std::io::{self, Write};

/// Plain text formatter
///
/// One line per token with its span, then one indented line per grouped
/// segment: `[start, end)`, surface, BuckWalter form and POS tags.
pub struct TextFormatter<W: Write> {
    writer: W,
    with_warnings: bool,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            with_warnings: true,
        }
    }

    /// Whether to print per-token warnings
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.with_warnings = enabled;
        self
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_sentence(&mut self, _source: &str, sentence: &SentenceAnalysis) -> Result<()> {
        for token in &sentence.tokens {
            writeln!(
                self.writer,
                "{} [{}, {}) analyses={}",
                token.text, token.start, token.end, token.analyses
            )?;
            for seg in &token.segments {
                writeln!(
                    self.writer,
                    "  [{}, {})\t{}\t{}\t{{{}}}",
                    seg.start,
                    seg.end,
                    seg.surface,
                    seg.buckwalter,
                    seg.pos.join(",")
                )?;
            }
            if self.with_warnings {
                for warning in &token.warnings {
                    writeln!(self.writer, "  ! {warning}")?;
                }
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
