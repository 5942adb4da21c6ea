//! Schema validation: turning a raw table into typed records.

use super::error::AggregationError;
use crate::dataset::Table;
use crate::models::{AgeBand, Record, Sex};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Names of the columns the engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_year")]
    pub year: String,
    #[serde(default = "default_sex")]
    pub sex: String,
    #[serde(default = "default_age")]
    pub age: String,
    #[serde(default = "default_suicides")]
    pub suicides: String,
    #[serde(default = "default_population")]
    pub population: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            country: default_country(),
            year: default_year(),
            sex: default_sex(),
            age: default_age(),
            suicides: default_suicides(),
            population: default_population(),
        }
    }
}

fn default_country() -> String {
    "country".to_string()
}

fn default_year() -> String {
    "year".to_string()
}

fn default_sex() -> String {
    "sex".to_string()
}

fn default_age() -> String {
    "age".to_string()
}

fn default_suicides() -> String {
    "suicides_no".to_string()
}

fn default_population() -> String {
    "population".to_string()
}

/// Resolved positions of the required columns.
struct ColumnIndices {
    country: usize,
    year: usize,
    sex: usize,
    age: usize,
    suicides: usize,
    population: usize,
}

impl ColumnIndices {
    fn resolve(table: &Table, columns: &ColumnMapping) -> Result<Self, AggregationError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| AggregationError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            country: find(&columns.country)?,
            year: find(&columns.year)?,
            sex: find(&columns.sex)?,
            age: find(&columns.age)?,
            suicides: find(&columns.suicides)?,
            population: find(&columns.population)?,
        })
    }
}

/// Validate the table against the required schema and convert every row.
///
/// Fails on the first missing column or malformed value; no partial result
/// is returned.
pub fn extract_records(
    table: &Table,
    columns: &ColumnMapping,
) -> Result<Vec<Record>, AggregationError> {
    let idx = ColumnIndices::resolve(table, columns)?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = RowCells {
                row: row.as_slice(),
                number: i + 1,
            };

            let country = cells.get(idx.country, &columns.country)?;
            if country.is_empty() {
                return Err(cells.malformed(&columns.country, "empty value".to_string()));
            }

            Ok(Record {
                country: country.to_string(),
                year: cells.parse::<i32>(idx.year, &columns.year)?,
                sex: cells.parse::<Sex>(idx.sex, &columns.sex)?,
                age: cells.parse::<AgeBand>(idx.age, &columns.age)?,
                suicides: cells.parse::<u64>(idx.suicides, &columns.suicides)?,
                population: cells.parse::<u64>(idx.population, &columns.population)?,
            })
        })
        .collect()
}

struct RowCells<'a> {
    row: &'a [String],
    /// 1-based data row number.
    number: usize,
}

impl<'a> RowCells<'a> {
    fn get(&self, index: usize, column: &str) -> Result<&'a str, AggregationError> {
        self.row
            .get(index)
            .map(|s| s.trim())
            .ok_or_else(|| self.malformed(column, "missing value".to_string()))
    }

    fn parse<T>(&self, index: usize, column: &str) -> Result<T, AggregationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(index, column)?;
        raw.parse::<T>()
            .map_err(|e| self.malformed(column, format!("cannot parse '{}': {}", raw, e)))
    }

    fn malformed(&self, column: &str, reason: String) -> AggregationError {
        AggregationError::MalformedField {
            row: self.number,
            column: column.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const HEADERS: [&str; 6] = ["country", "year", "sex", "age", "suicides_no", "population"];

    #[test]
    fn test_extract_records() {
        let t = table(
            &HEADERS,
            &[&["Albania", "1987", "male", "15-24 years", "21", "312900"]],
        );

        let records = extract_records(&t, &ColumnMapping::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country, "Albania");
        assert_eq!(records[0].year, 1987);
        assert_eq!(records[0].sex, Sex::Male);
        assert_eq!(records[0].age, AgeBand::From15To24);
        assert_eq!(records[0].suicides, 21);
        assert_eq!(records[0].population, 312_900);
    }

    #[test]
    fn test_missing_population_column() {
        let t = table(
            &["country", "year", "sex", "age", "suicides_no"],
            &[&["Albania", "1987", "male", "15-24 years", "21"]],
        );

        let err = extract_records(&t, &ColumnMapping::default()).unwrap_err();
        assert_eq!(
            err,
            AggregationError::MissingColumn {
                column: "population".to_string()
            }
        );
    }

    #[test]
    fn test_missing_column_on_empty_table() {
        let t = table(&["country"], &[]);
        let err = extract_records(&t, &ColumnMapping::default()).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_malformed_values() {
        let cases: [&[&str]; 5] = [
            &["Albania", "19x7", "male", "15-24 years", "21", "312900"],
            &["Albania", "1987", "other", "15-24 years", "21", "312900"],
            &["Albania", "1987", "male", "90+ years", "21", "312900"],
            &["Albania", "1987", "male", "15-24 years", "-1", "312900"],
            &["", "1987", "male", "15-24 years", "21", "312900"],
        ];

        for row in cases {
            let t = table(&HEADERS, &[row]);
            let err = extract_records(&t, &ColumnMapping::default()).unwrap_err();
            assert!(
                matches!(err, AggregationError::MalformedField { row: 1, .. }),
                "unexpected error for {:?}: {:?}",
                row,
                err
            );
        }
    }

    #[test]
    fn test_custom_column_names() {
        let t = table(
            &["Country", "Year", "Sex", "Age", "Count", "Pop"],
            &[&["Albania", "1987", "female", "75+ years", "1", "35600"]],
        );
        let columns = ColumnMapping {
            country: "Country".to_string(),
            year: "Year".to_string(),
            sex: "Sex".to_string(),
            age: "Age".to_string(),
            suicides: "Count".to_string(),
            population: "Pop".to_string(),
        };

        let records = extract_records(&t, &columns).unwrap();
        assert_eq!(records[0].age, AgeBand::Over75);
    }
}
