//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use sarf_engine::AnalyzerConfig;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating analyzer configuration template...");
        println!("  Output file: {}", self.output.display());

        fs::write(&self.output, AnalyzerConfig::template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Set resources.rules and resources.lexicon to your data files");
        println!("2. Validate your configuration:");
        println!("   sarf validate --config {}", self.output.display());
        println!("3. Use it for analysis:");
        println!("   sarf analyze -i input.txt --config {}", self.output.display());

        Ok(())
    }
}
