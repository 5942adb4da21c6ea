//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::GroupKey;
use clap::Parser;
use std::path::PathBuf;

/// suicide-rates - per-100k suicide rate tables from raw statistics
///
/// Loads a suicide statistics CSV (country, year, sex, age, suicides_no,
/// population, ...) and reports the suicide rate by country, year, sex and
/// age group, as Markdown or JSON.
///
/// Examples:
///   suicide-rates --input master.csv
///   suicide-rates --input master.csv --format json --output rates.json
///   suicide-rates --input master.csv --group-by sex,age
///   suicide-rates --input master.csv --dry-run
///   suicide-rates --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Statistics CSV file to aggregate
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "SUICIDE_RATES_INPUT",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting, or suicide_rates_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .suicide-rates.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tables to compute (comma-separated)
    ///
    /// Example: --group-by country,sex
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    pub group_by: Option<Vec<TableArg>>,

    /// Output order of the age group table (comma-separated labels)
    ///
    /// Every label must be one of the known age bands.
    #[arg(long, value_name = "LABELS", value_delimiter = ',')]
    pub age_order: Option<Vec<String>>,

    /// Express rates per this many people
    #[arg(long, value_name = "N")]
    pub per_population: Option<u64>,

    /// Decimal places for rates in the Markdown report
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Number of rows in the highest-rate rankings
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Leave the highlights section out of the report
    #[arg(long)]
    pub no_highlights: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and validate the dataset without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .suicide-rates.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Table selector for --group-by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableArg {
    Country,
    Year,
    Sex,
    Age,
}

impl TableArg {
    pub fn group_key(&self) -> GroupKey {
        match self {
            TableArg::Country => GroupKey::Country,
            TableArg::Year => GroupKey::Year,
            TableArg::Sex => GroupKey::Sex,
            TableArg::Age => GroupKey::AgeBand,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.per_population == Some(0) {
            return Err("Per-population must be at least 1".to_string());
        }

        if let Some(ref group_by) = self.group_by {
            if group_by.is_empty() {
                return Err("--group-by needs at least one table".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
