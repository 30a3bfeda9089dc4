//! Validate command implementation

use anyhow::Result;
use clap::Args;
use sarf_core::{MemoryLexicon, RuleDictionary};
use sarf_engine::AnalyzerConfig;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Configuration file naming the resources to check
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rule dictionary file
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Lexicon JSON file
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => {
                println!("Validating configuration: {}", path.display());
                match AnalyzerConfig::from_file(path) {
                    Ok(config) => {
                        println!("✓ Configuration is valid!");
                        config
                    }
                    Err(e) => {
                        println!("✗ Configuration is invalid!");
                        println!("  Error: {e}");
                        return Err(anyhow::anyhow!("Validation failed: {e}"));
                    }
                }
            }
            None => AnalyzerConfig::default(),
        };

        let rules = self.rules.clone().or(config.resources.rules);
        let lexicon = self.lexicon.clone().or(config.resources.lexicon);
        if rules.is_none() && lexicon.is_none() && self.config.is_none() {
            anyhow::bail!("Nothing to validate: pass --config, --rules or --lexicon");
        }

        let mut failed = false;

        if let Some(path) = rules {
            println!("Validating rule dictionary: {}", path.display());
            match RuleDictionary::from_file(&path, &config.capacities) {
                Ok(dict) => {
                    println!("✓ Rule dictionary is valid!");
                    println!("  Rules: {}", dict.len());
                    println!("  {}", dict.summary());
                }
                Err(e) => {
                    println!("✗ Rule dictionary is invalid!");
                    println!("  Error: {e}");
                    failed = true;
                }
            }
        }

        if let Some(path) = lexicon {
            println!("Validating lexicon: {}", path.display());
            match MemoryLexicon::from_file(&path) {
                Ok(lex) => {
                    println!("✓ Lexicon is valid!");
                    println!("  Entries: {}", lex.len());
                    println!("  Distinct keys: {}", lex.key_count());
                }
                Err(e) => {
                    println!("✗ Lexicon is invalid!");
                    println!("  Error: {e}");
                    failed = true;
                }
            }
        }

        if failed {
            anyhow::bail!("Validation failed");
        }
        Ok(())
    }
}
