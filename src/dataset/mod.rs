//! Dataset loading.
//!
//! This module reads the statistics CSV into an in-memory [`Table`]. The
//! caller owns the table and passes it by reference to every aggregation;
//! nothing here keeps the dataset around.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Configuration for dataset loading.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Metadata columns removed right after loading.
    pub drop_columns: Vec<String>,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            drop_columns: vec!["HDI for year", "country-year"]
                .into_iter()
                .map(String::from)
                .collect(),
            delimiter: b',',
        }
    }
}

impl TryFrom<&crate::config::DatasetConfig> for LoadConfig {
    type Error = anyhow::Error;

    /// The CSV reader splits on a single byte, so the delimiter must be ASCII.
    fn try_from(config: &crate::config::DatasetConfig) -> Result<Self> {
        let delimiter = u8::try_from(config.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| {
                format!(
                    "Invalid dataset delimiter {:?}: must be a single ASCII character",
                    config.delimiter
                )
            })?;

        Ok(Self {
            drop_columns: config.drop_columns.clone(),
            delimiter,
        })
    }
}

/// Raw tabular dataset: named columns and rows of text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Shape of a loaded table, for dry runs and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<String>,
}

impl Table {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Remove the named columns. Names that are not present are ignored.
    /// Returns the names that were actually removed.
    pub fn drop_columns(&mut self, names: &[String]) -> Vec<String> {
        let mut indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        indices.sort_unstable();
        indices.dedup();

        let dropped = indices.iter().map(|&i| self.headers[i].clone()).collect();

        for &idx in indices.iter().rev() {
            self.headers.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
        }

        dropped
    }

    pub fn describe(&self) -> TableSummary {
        TableSummary {
            rows: self.rows.len(),
            columns: self.headers.clone(),
        }
    }
}

/// Loads statistics CSV files into tables.
pub struct DatasetLoader {
    config: LoadConfig,
}

impl DatasetLoader {
    /// Create a new loader.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load a CSV file from disk.
    pub fn load(&self, path: &Path) -> Result<Table> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        self.load_from_reader(file)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))
    }

    /// Load CSV data from any reader.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Table> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.config.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Malformed CSV record {}", idx + 1))?;
            rows.push(record.iter().map(String::from).collect());
        }

        let mut table = Table::new(headers, rows);
        let dropped = table.drop_columns(&self.config.drop_columns);
        if !dropped.is_empty() {
            debug!("Dropped metadata columns: {}", dropped.join(", "));
        }

        info!(
            "Loaded {} rows with {} columns",
            table.len(),
            table.headers().len()
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
country,year,sex,age,suicides_no,population,suicides/100k pop,country-year,HDI for year,gdp_for_year ($),gdp_per_capita ($),generation
Albania,1987,male,15-24 years,21,312900,6.71,Albania1987,,\"2,156,624,900\",796,Generation X
Albania,1987,female,75+ years,1,35600,2.81,Albania1987,,\"2,156,624,900\",796,G.I. Generation
";

    #[test]
    fn test_load_drops_metadata_columns() {
        let loader = DatasetLoader::new(LoadConfig::default());
        let table = loader.load_from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.column_index("country-year").is_none());
        assert!(table.column_index("HDI for year").is_none());
        assert_eq!(table.column_index("country"), Some(0));
        assert_eq!(table.headers().len(), 10);
        assert!(table.rows().iter().all(|r| r.len() == 10));
    }

    #[test]
    fn test_load_keeps_quoted_commas() {
        let loader = DatasetLoader::new(LoadConfig::default());
        let table = loader.load_from_reader(SAMPLE.as_bytes()).unwrap();

        let gdp = table.column_index("gdp_for_year ($)").unwrap();
        assert_eq!(table.rows()[0][gdp], "2,156,624,900");
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("master.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let loader = DatasetLoader::new(LoadConfig::default());
        let table = loader.load(&path).unwrap();
        assert_eq!(table.describe().rows, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let loader = DatasetLoader::new(LoadConfig::default());
        let result = loader.load(&temp.path().join("missing.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_ragged_rows() {
        let data = "country,year\nAlbania,1987\nAlbania\n";
        let loader = DatasetLoader::new(LoadConfig::default());
        assert!(loader.load_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_config_from_dataset_config() {
        let config = crate::config::DatasetConfig {
            delimiter: ';',
            ..Default::default()
        };
        let load = LoadConfig::try_from(&config).unwrap();
        assert_eq!(load.delimiter, b';');

        let loader = DatasetLoader::new(load);
        let table = loader
            .load_from_reader("country;year\nAlbania;1987\n".as_bytes())
            .unwrap();
        assert_eq!(table.rows()[0], vec!["Albania".to_string(), "1987".to_string()]);
    }

    #[test]
    fn test_load_config_rejects_non_ascii_delimiter() {
        for delimiter in ['\u{12c}', '§'] {
            let config = crate::config::DatasetConfig {
                delimiter,
                ..Default::default()
            };
            let err = LoadConfig::try_from(&config).unwrap_err();
            assert!(err.to_string().contains("delimiter"), "{}", err);
        }
    }

    #[test]
    fn test_drop_columns_ignores_unknown() {
        let mut table = Table::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]],
        );

        let dropped = table.drop_columns(&["c".to_string(), "zzz".to_string(), "a".to_string()]);

        assert_eq!(dropped, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(table.headers(), &["b".to_string()]);
        assert_eq!(table.rows()[0], vec!["2".to_string()]);
    }
}
