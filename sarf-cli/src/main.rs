//! Sarf command-line entry point

use clap::Parser;
use sarf_cli::commands::Commands;

/// Arabic morphological segmentation
#[derive(Debug, Parser)]
#[command(name = "sarf", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
