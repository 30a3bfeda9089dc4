//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use sarf_engine::{SentenceAnalysis, TokenAnalysis};
use serde::Serialize;
use std::io::Write;

/// JSON formatter - outputs sentences as a JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    records: Vec<SentenceRecord>,
}

/// One sentence in the JSON output
#[derive(Debug, Serialize)]
pub struct SentenceRecord {
    /// File the sentence came from
    pub file: String,
    /// The sentence text
    pub text: String,
    /// Document offset of the first character
    pub start: usize,
    /// Document offset past the last character
    pub end: usize,
    /// Analyzed tokens
    pub tokens: Vec<TokenAnalysis>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_sentence(&mut self, source: &str, sentence: &SentenceAnalysis) -> Result<()> {
        self.records.push(SentenceRecord {
            file: source.to_string(),
            text: sentence.text.clone(),
            start: sentence.start,
            end: sentence.end,
            tokens: sentence.tokens.clone(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array() {
        let sentence = SentenceAnalysis {
            text: "x".to_string(),
            start: 4,
            end: 5,
            tokens: Vec::new(),
        };
        let mut out = Vec::new();
        {
            let mut fmt = JsonFormatter::new(&mut out);
            fmt.format_sentence("a.txt", &sentence).unwrap();
            fmt.finish().unwrap();
        }
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["file"], "a.txt");
        assert_eq!(value[0]["start"], 4);
        assert!(value[0]["tokens"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_output_is_empty_array() {
        let mut out = Vec::new();
        JsonFormatter::new(&mut out).finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }
}
