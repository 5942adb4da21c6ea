//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.suicide-rates.toml` files.

use crate::analysis::ColumnMapping;
use crate::cli::OutputFormat;
use crate::models::{GroupKey, AGE_BAND_ORDER, DEFAULT_PER_POPULATION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".suicide-rates.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "suicide_rates_report.md".to_string()
}

fn default_json_output() -> String {
    "suicide_rates_report.json".to_string()
}

/// Dataset loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Field delimiter of the CSV file.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Metadata columns dropped before aggregation.
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Names of the required columns.
    #[serde(default)]
    pub columns: ColumnMapping,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            drop_columns: default_drop_columns(),
            columns: ColumnMapping::default(),
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_drop_columns() -> Vec<String> {
    vec!["HDI for year", "country-year"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Rates are expressed per this many people.
    #[serde(default = "default_per_population")]
    pub per_population: u64,

    /// Output order of the age-band table. Every entry must be a known band.
    #[serde(default = "default_age_order")]
    pub age_order: Vec<String>,

    /// Tables to compute, in report order.
    #[serde(default = "default_tables")]
    pub tables: Vec<GroupKey>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            per_population: default_per_population(),
            age_order: default_age_order(),
            tables: default_tables(),
        }
    }
}

fn default_per_population() -> u64 {
    DEFAULT_PER_POPULATION
}

fn default_age_order() -> Vec<String> {
    AGE_BAND_ORDER.iter().map(|s| s.to_string()).collect()
}

fn default_tables() -> Vec<GroupKey> {
    GroupKey::ALL.to_vec()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report title. `{start}` and `{end}` are replaced by the year range.
    #[serde(default = "default_title")]
    pub title: String,

    /// Include the highlights section.
    #[serde(default = "default_true")]
    pub include_highlights: bool,

    /// Include summed counts and populations next to each rate.
    #[serde(default = "default_true")]
    pub include_totals: bool,

    /// Decimal places for rates.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Number of rows in "highest rates" rankings.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            include_highlights: true,
            include_totals: true,
            precision: default_precision(),
            top: default_top(),
        }
    }
}

fn default_title() -> String {
    "Exploration of Suicide Data ({start}-{end})".to_string()
}

fn default_true() -> bool {
    true
}

fn default_precision() -> usize {
    2
}

fn default_top() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        } else if args.format == OutputFormat::Json && self.general.output == default_output() {
            self.general.output = default_json_output();
        }

        if let Some(per_population) = args.per_population {
            self.aggregation.per_population = per_population;
        }

        if let Some(ref age_order) = args.age_order {
            self.aggregation.age_order = age_order.clone();
        }

        if let Some(ref group_by) = args.group_by {
            self.aggregation.tables = group_by.iter().map(|t| t.group_key()).collect();
        }

        if let Some(precision) = args.precision {
            self.report.precision = precision;
        }

        if let Some(top) = args.top {
            self.report.top = top;
        }

        if args.no_highlights {
            self.report.include_highlights = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }

    /// Report title with the year range filled in.
    pub fn title_for(&self, year_range: Option<(i32, i32)>) -> String {
        match year_range {
            Some((start, end)) => self
                .report
                .title
                .replace("{start}", &start.to_string())
                .replace("{end}", &end.to_string()),
            None => self
                .report
                .title
                .replace(" ({start}-{end})", "")
                .replace("{start}", "")
                .replace("{end}", ""),
        }
    }
}
