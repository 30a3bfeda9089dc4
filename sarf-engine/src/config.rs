//! Analyzer configuration
//!
//! Loaded from TOML. Every section is optional and falls back to its
//! defaults, so an empty file is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use sarf_core::{Capacities, MergePatterns, MergeRules};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default number of analyses kept per word
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Resource file locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Rule dictionary file
    pub rules: Option<PathBuf>,
    /// Lexicon JSON file
    pub lexicon: Option<PathBuf>,
}

/// Per-word and per-sentence analysis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analyses kept per word; extras are dropped with a warning
    pub max_results: usize,
    /// Emit punctuation as separate tokens
    pub split_punctuation: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            split_punctuation: true,
        }
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Resource files
    pub resources: ResourceConfig,
    /// Analysis settings
    pub analysis: AnalysisConfig,
    /// Capacity bounds
    pub capacities: Capacities,
    /// Clitic merge patterns
    pub merge: MergePatterns,
}

impl AnalyzerConfig {
    /// Start a builder from the defaults
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }

    /// Balanced defaults
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Keep only the best few analyses per word
    pub fn strict() -> Self {
        Self {
            analysis: AnalysisConfig {
                max_results: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Keep every analysis the capacities allow
    pub fn exhaustive() -> Self {
        let capacities = Capacities::default();
        Self {
            analysis: AnalysisConfig {
                max_results: capacities.max_solutions,
                ..Default::default()
            },
            capacities,
            ..Default::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalyzerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// Relative resource paths are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::IoError(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&text)
            .map_err(|e| EngineError::ConfigError(format!("{}: {e}", path.display())))?;
        if let Some(dir) = path.parent() {
            config.resources.rules = config.resources.rules.map(|p| dir.join(p));
            config.resources.lexicon = config.resources.lexicon.map(|p| dir.join(p));
        }
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check bounds and compile merge patterns
    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_results == 0 {
            return Err(EngineError::ConfigError(
                "analysis.max_results must be positive".to_string(),
            ));
        }
        self.capacities
            .validate()
            .map_err(|e| EngineError::ConfigError(format!("capacities: {e}")))?;
        MergeRules::from_patterns(&self.merge)?;
        Ok(())
    }

    /// Commented TOML describing every option with its default
    pub fn template() -> String {
        let caps = Capacities::default();
        let merge = MergePatterns::default();
        let list = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| format!("    '{p}',"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            r#"# Sarf analyzer configuration

[resources]
# Rule dictionary: a rule count, then "P1 CAT1 P2 CAT2" tuples
# rules = "rules.txt"
# Lexicon: JSON with "entries" (and optional "encoding": "buckwalter")
# lexicon = "lexicon.json"

[analysis]
# Analyses kept per word; extra analyses are dropped with a warning
max_results = {max_results}
# Emit punctuation as separate tokens
split_punctuation = true

# Fixed bounds; exceeding one aborts the analysis
[capacities]
max_rules = {max_rules}
max_following = {max_following}
max_entries_per_key = {max_entries_per_key}
max_solutions = {max_solutions}
max_flattened = {max_flattened}
max_analyses = {max_analyses}
max_merge_chars = {max_merge_chars}
max_word_chars = {max_word_chars}

# Part-of-speech patterns (regular expressions) for clitic merging
[merge]
# Fused forward onto the next segment, for segments not tagged PREFIX
prefix_inflections = [
{prefix}
]
# Fused forward onto the next segment, for segments tagged PREFIX
prefixed_inflections = [
{prefixed}
]
# Appended to the previous unit, for SUFFIX segments
suffix_inflections = [
{suffix}
]
# Appended to the previous unit, for segments of category ADDED
added_suffix_inflections = [
{added}
]
"#,
            max_results = DEFAULT_MAX_RESULTS,
            max_rules = caps.max_rules,
            max_following = caps.max_following,
            max_entries_per_key = caps.max_entries_per_key,
            max_solutions = caps.max_solutions,
            max_flattened = caps.max_flattened,
            max_analyses = caps.max_analyses,
            max_merge_chars = caps.max_merge_chars,
            max_word_chars = caps.max_word_chars,
            prefix = list(&merge.prefix_inflections),
            prefixed = list(&merge.prefixed_inflections),
            suffix = list(&merge.suffix_inflections),
            added = list(&merge.added_suffix_inflections),
        )
    }
}

/// Builder for [`AnalyzerConfig`]
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a preset
    pub fn from_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Set the rule dictionary file
    pub fn rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.resources.rules = Some(path.into());
        self
    }

    /// Set the lexicon file
    pub fn lexicon(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.resources.lexicon = Some(path.into());
        self
    }

    /// Set the number of analyses kept per word
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config.analysis.max_results = max_results;
        self
    }

    /// Emit punctuation as separate tokens
    pub fn split_punctuation(mut self, split: bool) -> Self {
        self.config.analysis.split_punctuation = split;
        self
    }

    /// Replace the capacity bounds
    pub fn capacities(mut self, capacities: Capacities) -> Self {
        self.config.capacities = capacities;
        self
    }

    /// Replace the merge patterns
    pub fn merge_patterns(mut self, patterns: MergePatterns) -> Self {
        self.config.merge = patterns;
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<AnalyzerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
