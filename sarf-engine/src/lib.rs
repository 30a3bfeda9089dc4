//! Analyzer orchestration for Arabic morphological segmentation
//!
//! This crate loads the rule dictionary and lexicon described by an
//! [`AnalyzerConfig`], tokenizes sentences, and runs every token through the
//! segmenter and seeding chart of `sarf-core`.

#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod output;
pub mod tokenizer;

// Re-export key types
pub use analyzer::Analyzer;
pub use config::{AnalysisConfig, AnalyzerConfig, AnalyzerConfigBuilder, ResourceConfig};
pub use error::{EngineError, Result};
pub use output::{SegmentOutput, SentenceAnalysis, TokenAnalysis};
pub use tokenizer::Tokenizer;

// Re-export from core for convenience
pub use sarf_core::{Capacities, MergePatterns, Warning};
