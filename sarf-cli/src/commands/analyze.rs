//! Analyze command implementation

use anyhow::{Context, Result};
use clap::Args;
use sarf_engine::{Analyzer, AnalyzerConfig, AnalyzerConfigBuilder, EngineError};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{JsonFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;

/// Arguments for the analyze command
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preset used when no configuration file is given
    #[arg(short, long, value_enum, default_value = "balanced")]
    pub preset: Preset,

    /// Rule dictionary file (overrides the configuration)
    #[arg(long, value_name = "FILE", env = "SARF_RULES")]
    pub rules: Option<PathBuf>,

    /// Lexicon JSON file (overrides the configuration)
    #[arg(long, value_name = "FILE", env = "SARF_LEXICON")]
    pub lexicon: Option<PathBuf>,

    /// Maximum analyses kept per word
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tokens and their segments, one per line
    Text,
    /// JSON array of sentences with metadata
    Json,
}

/// Configuration presets
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Preset {
    /// Default limits
    Balanced,
    /// Few analyses per word
    Strict,
    /// Every analysis the solution cap allows
    Exhaustive,
}

impl Preset {
    fn config(self) -> AnalyzerConfig {
        match self {
            Preset::Balanced => AnalyzerConfig::balanced(),
            Preset::Strict => AnalyzerConfig::strict(),
            Preset::Exhaustive => AnalyzerConfig::exhaustive(),
        }
    }
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting analysis");
        log::debug!("Arguments: {self:?}");

        let config = self.build_config()?;
        let analyzer = Analyzer::new(config).map_err(load_error)?;

        let files = resolve_patterns(&self.input)?;
        log::info!("Found {} files to analyze", files.len());

        let mut formatter = self.create_formatter()?;
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        for file in &files {
            let text = FileReader::read_text(file)?;
            let name = file.display().to_string();
            let sentences = analyzer
                .analyze_document(&text)
                .map_err(|e| CliError::AnalysisError(format!("{name}: {e}")))?;

            for sentence in &sentences {
                for warning in sentence.warnings() {
                    log::warn!("{name}: {warning}");
                }
                formatter.format_sentence(&name, sentence)?;
            }
            progress.file_completed(&name);
        }

        formatter.finish()?;
        progress.finish();
        Ok(())
    }

    /// Resolve the configuration: file or preset, then command-line overrides
    pub fn build_config(&self) -> Result<AnalyzerConfig> {
        let base = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => self.preset.config(),
        };

        let mut builder = AnalyzerConfigBuilder::from_config(base);
        if let Some(rules) = &self.rules {
            builder = builder.rules(rules);
        }
        if let Some(lexicon) = &self.lexicon {
            builder = builder.lexicon(lexicon);
        }
        if let Some(max) = self.max_results {
            builder = builder.max_results(max);
        }
        Ok(builder
            .build()
            .map_err(|e| CliError::ConfigError(e.to_string()))?)
    }

    fn create_formatter(&self) -> Result<Box<dyn OutputFormatter>> {
        let with_warnings = self.verbose > 0;
        let formatter: Box<dyn OutputFormatter> = match (&self.output, self.format) {
            (Some(path), format) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let writer = BufWriter::new(file);
                match format {
                    OutputFormat::Text => {
                        Box::new(TextFormatter::new(writer).with_warnings(with_warnings))
                    }
                    OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
                }
            }
            (None, OutputFormat::Text) => {
                Box::new(TextFormatter::new(io::stdout()).with_warnings(with_warnings))
            }
            (None, OutputFormat::Json) => Box::new(JsonFormatter::new(io::stdout())),
        };
        Ok(formatter)
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // a second init in the same process is harmless
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }

        Ok(())
    }
}

/// Only configuration problems become [`CliError::ConfigError`]; resource
/// failures keep their engine error underneath the context
fn load_error(err: EngineError) -> anyhow::Error {
    match err {
        EngineError::ConfigError(msg) => CliError::ConfigError(msg).into(),
        other => anyhow::Error::new(other).context("Failed to load analyzer resources"),
    }
}
