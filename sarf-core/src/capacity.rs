//! Fixed capacity bounds
//!
//! Every table and per-call buffer in the core is bounded. Exceeding a bound
//! is a hard [`MorphError::CapacityExceeded`](crate::MorphError) failure.

use serde::{Deserialize, Serialize};

use crate::normalizer::MAX_NORMALIZED_LEN;

/// Capacity bounds for one analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    /// Distinct rules in the rule dictionary
    pub max_rules: usize,
    /// Following categories recorded per (position, category)
    pub max_following: usize,
    /// Lexicon entries fetched per prefix/stem/suffix key
    pub max_entries_per_key: usize,
    /// Size of each solution list (known stem, unknown stem)
    pub max_solutions: usize,
    /// Leaves produced by flattening one analysis
    pub max_flattened: usize,
    /// Analyses processed per token
    pub max_analyses: usize,
    /// Characters in one merged unit
    pub max_merge_chars: usize,
    /// Characters accepted by the normalizer
    pub max_word_chars: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            max_rules: 100_000,
            max_following: 500,
            max_entries_per_key: 100,
            max_solutions: 1_000,
            max_flattened: 32,
            max_analyses: 200,
            max_merge_chars: MAX_NORMALIZED_LEN,
            max_word_chars: MAX_NORMALIZED_LEN,
        }
    }
}

impl Capacities {
    /// Reject bounds that would make every analysis fail
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("max_rules", self.max_rules),
            ("max_following", self.max_following),
            ("max_entries_per_key", self.max_entries_per_key),
            ("max_solutions", self.max_solutions),
            ("max_flattened", self.max_flattened),
            ("max_analyses", self.max_analyses),
            ("max_merge_chars", self.max_merge_chars),
            ("max_word_chars", self.max_word_chars),
        ];
        match fields.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(format!("{name} must be greater than zero")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Capacities::default().validate().is_ok());
    }

    #[test]
    fn test_zero_bound_rejected() {
        let caps = Capacities {
            max_flattened: 0,
            ..Default::default()
        };
        assert_eq!(
            caps.validate().unwrap_err(),
            "max_flattened must be greater than zero"
        );
    }
}
