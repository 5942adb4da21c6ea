//! Rate aggregation.
//!
//! Partitions records by a group key, sums suicide counts and populations
//! independently per group and derives a per-100k rate from the two sums.
//! Everything here is a pure function of its inputs.

use super::error::AggregationError;
use super::schema::{extract_records, ColumnMapping};
use crate::dataset::Table;
use crate::models::{
    FailedTable, GroupKey, Rate, Record, SummaryRow, SummaryTable, AGE_BAND_ORDER,
    DEFAULT_PER_POPULATION,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Settings shared by all tables computed from one dataset.
#[derive(Debug, Clone)]
pub struct AggregationSettings {
    /// Names of the required columns.
    pub columns: ColumnMapping,
    /// Rates are expressed per this many people.
    pub per_population: u64,
    /// Output order for the age-band table.
    pub age_order: Vec<String>,
    /// Tables to compute, in report order.
    pub keys: Vec<GroupKey>,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            per_population: DEFAULT_PER_POPULATION,
            age_order: AGE_BAND_ORDER.iter().map(|s| s.to_string()).collect(),
            keys: GroupKey::ALL.to_vec(),
        }
    }
}

impl From<&crate::config::Config> for AggregationSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            columns: config.dataset.columns.clone(),
            per_population: config.aggregation.per_population,
            age_order: config.aggregation.age_order.clone(),
            keys: config.aggregation.tables.clone(),
        }
    }
}

impl AggregationSettings {
    /// Category order applied to a key, if any.
    pub fn category_order(&self, key: GroupKey) -> Option<&[String]> {
        match key {
            GroupKey::AgeBand => Some(self.age_order.as_slice()),
            _ => None,
        }
    }
}

/// All tables computed from one dataset.
#[derive(Debug, Clone)]
pub struct Summaries {
    /// Number of records aggregated.
    pub records: usize,
    /// First and last year present in the dataset.
    pub year_range: Option<(i32, i32)>,
    pub tables: Vec<SummaryTable>,
    /// Tables whose category order was rejected.
    pub failed: Vec<FailedTable>,
}

impl Summaries {
    /// Find a computed table by key.
    pub fn table(&self, key: GroupKey) -> Option<&SummaryTable> {
        self.tables.iter().find(|t| t.group_key == key)
    }
}

/// Running sums for one group.
#[derive(Debug)]
struct Group {
    key: String,
    /// Sort rank: the year for year groups, first-seen position otherwise.
    rank: i64,
    suicides: u64,
    population: u64,
}

impl Group {
    fn into_row(self, per_population: u64) -> SummaryRow {
        SummaryRow {
            rate: Rate::compute(self.suicides, self.population, per_population),
            key: self.key,
            suicides: self.suicides,
            population: self.population,
        }
    }
}

/// Compute the summary table of `table` for one group key.
///
/// The table is validated against the schema first, so a missing or
/// malformed required field fails before any rate is computed.
pub fn aggregate_by(
    table: &Table,
    columns: &ColumnMapping,
    group_key: GroupKey,
    category_order: Option<&[String]>,
    per_population: u64,
) -> Result<SummaryTable, AggregationError> {
    let records = extract_records(table, columns)?;
    aggregate_records(&records, group_key, category_order, per_population)
}

/// Compute the summary table of already validated records.
///
/// With a category order, rows follow that order exactly: categories without
/// records get an undefined rate and records outside the order are left out.
/// Without one, age bands follow [`AGE_BAND_ORDER`], year groups are
/// chronological and all other groups keep first-seen order.
pub fn aggregate_records(
    records: &[Record],
    group_key: GroupKey,
    category_order: Option<&[String]>,
    per_population: u64,
) -> Result<SummaryTable, AggregationError> {
    if let Some(order) = category_order {
        validate_category_order(group_key, order)?;
    }

    let mut groups = partition(records, group_key)?;

    let rows = match category_order {
        Some(order) => reindex(groups, order, per_population),
        None if group_key == GroupKey::AgeBand => {
            let order: Vec<String> = AGE_BAND_ORDER.iter().map(|s| s.to_string()).collect();
            reindex(groups, &order, per_population)
        }
        None => {
            groups.sort_by_key(|g| g.rank);
            groups
                .into_iter()
                .map(|g| g.into_row(per_population))
                .collect()
        }
    };

    debug!(
        "Aggregated {} records by {} into {} rows",
        records.len(),
        group_key,
        rows.len()
    );

    Ok(SummaryTable { group_key, rows })
}

/// Compute every configured table from one dataset.
///
/// A schema error aborts all tables. A rejected category order only drops
/// the table it belongs to; the rest are still computed.
pub fn summarize(
    table: &Table,
    settings: &AggregationSettings,
) -> Result<Summaries, AggregationError> {
    let records = extract_records(table, &settings.columns)?;

    let mut tables = Vec::new();
    let mut failed = Vec::new();

    for &key in &settings.keys {
        match aggregate_records(
            &records,
            key,
            settings.category_order(key),
            settings.per_population,
        ) {
            Ok(summary) => tables.push(summary),
            Err(e) if e.is_category_order_error() => {
                warn!("Skipping {} table: {}", key, e);
                failed.push(FailedTable {
                    group_key: key,
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Summaries {
        records: records.len(),
        year_range: year_range(&records),
        tables,
        failed,
    })
}

/// Check an explicit order against the key's closed set and for duplicates.
pub fn validate_category_order(
    group_key: GroupKey,
    order: &[String],
) -> Result<(), AggregationError> {
    let mut seen = HashSet::new();

    for value in order {
        if let Some(closed) = group_key.closed_set() {
            if !closed.contains(&value.as_str()) {
                return Err(AggregationError::InvalidCategoryOrder {
                    key: group_key,
                    value: value.clone(),
                });
            }
        }

        if !seen.insert(value.as_str()) {
            return Err(AggregationError::DuplicateCategory {
                key: group_key,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

/// First and last year present in the records.
pub fn year_range(records: &[Record]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}

/// Rows sorted by rate, highest first, undefined rates excluded.
pub fn ranked_rows(table: &SummaryTable, n: usize) -> Vec<&SummaryRow> {
    let mut rows: Vec<&SummaryRow> = table.rows.iter().filter(|r| r.rate.is_defined()).collect();

    rows.sort_by(|a, b| {
        b.rate
            .raw()
            .partial_cmp(&a.rate.raw())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(n);

    rows
}

/// Group records by key in first-seen order, summing counts and populations.
///
/// A sum that no longer fits in `u64` is reported against the record that
/// overflowed it.
fn partition(records: &[Record], group_key: GroupKey) -> Result<Vec<Group>, AggregationError> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let key = record.key_label(group_key);

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let rank = match group_key {
                    GroupKey::Year => i64::from(record.year),
                    _ => groups.len() as i64,
                };
                groups.push(Group {
                    key: key.clone(),
                    rank,
                    suicides: 0,
                    population: 0,
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        match (
            group.suicides.checked_add(record.suicides),
            group.population.checked_add(record.population),
        ) {
            (Some(suicides), Some(population)) => {
                group.suicides = suicides;
                group.population = population;
            }
            (None, _) => return Err(sum_overflow(i + 1, "suicides", group_key, &group.key)),
            (_, None) => return Err(sum_overflow(i + 1, "population", group_key, &group.key)),
        }
    }

    Ok(groups)
}

fn sum_overflow(row: usize, column: &str, group_key: GroupKey, key: &str) -> AggregationError {
    AggregationError::MalformedField {
        row,
        column: column.to_string(),
        reason: format!("sum for {} '{}' overflows", group_key, key),
    }
}

/// Emit one row per category of `order`, in that order.
fn reindex(groups: Vec<Group>, order: &[String], per_population: u64) -> Vec<SummaryRow> {
    let mut by_key: HashMap<String, Group> =
        groups.into_iter().map(|g| (g.key.clone(), g)).collect();

    let rows: Vec<SummaryRow> = order
        .iter()
        .map(|category| match by_key.remove(category) {
            Some(group) => group.into_row(per_population),
            None => SummaryRow {
                key: category.clone(),
                suicides: 0,
                population: 0,
                rate: Rate::UNDEFINED,
            },
        })
        .collect();

    if !by_key.is_empty() {
        let mut left_out: Vec<&str> = by_key.keys().map(String::as_str).collect();
        left_out.sort_unstable();
        debug!("Categories not in order, left out: {}", left_out.join(", "));
    }

    rows
}
