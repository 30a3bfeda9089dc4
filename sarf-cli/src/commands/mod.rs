//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod analyze;
pub mod generate_config;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment Arabic text files and align segments with the source text
    Analyze(analyze::AnalyzeArgs),

    /// Check that a rule dictionary and lexicon load
    Validate(validate::ValidateArgs),

    /// Write a commented configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List available output formats
    Formats,

    /// List configuration presets
    Presets,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Analyze(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                subcommand.execute();
                Ok(())
            }
        }
    }
}

impl ListCommands {
    fn execute(&self) {
        match self {
            ListCommands::Formats => {
                println!("Available output formats:");
                println!("  text - One line per token, one indented line per segment");
                println!("  json - JSON array of sentences with token analyses");
            }
            ListCommands::Presets => {
                println!("Available presets:");
                println!("  balanced   - Default limits, up to 100 analyses per word");
                println!("  strict     - Keep at most 10 analyses per word");
                println!("  exhaustive - Keep every analysis the solution cap allows");
            }
        }
    }
}
