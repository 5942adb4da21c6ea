//! Data models for the suicide statistics aggregator.
//!
//! This module contains the core data structures used throughout the
//! application: typed input records, group keys, rates, summary tables and
//! the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Version of [`AGE_BAND_ORDER`]. Bump when the closed set or its order changes.
pub const AGE_BAND_ORDER_VERSION: u32 = 1;

/// Closed set of age-band labels, youngest to oldest.
pub const AGE_BAND_ORDER: [&str; 6] = [
    "5-14 years",
    "15-24 years",
    "25-34 years",
    "35-54 years",
    "55-74 years",
    "75+ years",
];

/// Closed set of sex labels.
pub const SEX_LABELS: [&str; 2] = ["male", "female"];

/// Rates are expressed per this many people unless configured otherwise.
pub const DEFAULT_PER_POPULATION: u64 = 100_000;

/// Sex of the population an observation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

/// Age band of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "5-14 years")]
    From5To14,
    #[serde(rename = "15-24 years")]
    From15To24,
    #[serde(rename = "25-34 years")]
    From25To34,
    #[serde(rename = "35-54 years")]
    From35To54,
    #[serde(rename = "55-74 years")]
    From55To74,
    #[serde(rename = "75+ years")]
    Over75,
}

impl AgeBand {
    /// All bands in [`AGE_BAND_ORDER`] order.
    pub const ALL: [AgeBand; 6] = [
        AgeBand::From5To14,
        AgeBand::From15To24,
        AgeBand::From25To34,
        AgeBand::From35To54,
        AgeBand::From55To74,
        AgeBand::Over75,
    ];

    pub fn label(&self) -> &'static str {
        AGE_BAND_ORDER[*self as usize]
    }

    /// Short form used in highlights, e.g. `75+` for `75+ years`.
    pub fn short_label(&self) -> &'static str {
        self.label().trim_end_matches(" years")
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AgeBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AGE_BAND_ORDER
            .iter()
            .position(|label| *label == trimmed)
            .map(|idx| AgeBand::ALL[idx])
            .ok_or_else(|| format!("unknown age band '{}'", trimmed))
    }
}

/// A single validated observation from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    pub sex: Sex,
    pub age: AgeBand,
    /// Number of suicides observed.
    pub suicides: u64,
    /// Size of the population the count refers to.
    pub population: u64,
}

impl Record {
    /// Returns the value of this record for the given group key, as a label.
    pub fn key_label(&self, key: GroupKey) -> String {
        match key {
            GroupKey::Country => self.country.clone(),
            GroupKey::Year => self.year.to_string(),
            GroupKey::Sex => self.sex.label().to_string(),
            GroupKey::AgeBand => self.age.label().to_string(),
        }
    }
}

/// Dimension records are partitioned by before computing rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Country,
    Year,
    Sex,
    AgeBand,
}

impl GroupKey {
    /// All group keys in report order.
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Country,
        GroupKey::Year,
        GroupKey::Sex,
        GroupKey::AgeBand,
    ];

    /// Column header used for the key in rendered tables.
    pub fn column_label(&self) -> &'static str {
        match self {
            GroupKey::Country => "Country Name",
            GroupKey::Year => "Year",
            GroupKey::Sex => "Sex",
            GroupKey::AgeBand => "Age Group",
        }
    }

    /// Section title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            GroupKey::Country => "Suicide Rate Across Countries",
            GroupKey::Year => "By Year of Occurrence",
            GroupKey::Sex => "By Gender",
            GroupKey::AgeBand => "By Age Group",
        }
    }

    /// Closed set of valid values, when the dimension has one.
    pub fn closed_set(&self) -> Option<&'static [&'static str]> {
        match self {
            GroupKey::Sex => Some(&SEX_LABELS[..]),
            GroupKey::AgeBand => Some(&AGE_BAND_ORDER[..]),
            GroupKey::Country | GroupKey::Year => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Country => write!(f, "country"),
            GroupKey::Year => write!(f, "year"),
            GroupKey::Sex => write!(f, "sex"),
            GroupKey::AgeBand => write!(f, "age_band"),
        }
    }
}

/// Suicides per `per_population` people.
///
/// A rate is undefined (NaN) when its group has no population. Undefined
/// rates are carried as values all the way to the report and serialize to
/// `null`; they are never replaced by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate(f64);

impl Rate {
    pub const UNDEFINED: Rate = Rate(f64::NAN);

    /// Computes `suicides / population * per_population` as a ratio of sums.
    pub fn compute(suicides: u64, population: u64, per_population: u64) -> Self {
        if population == 0 {
            return Rate::UNDEFINED;
        }
        Rate(suicides as f64 / population as f64 * per_population as f64)
    }

    /// Raw value, NaN when undefined.
    pub fn raw(&self) -> f64 {
        self.0
    }

    /// Returns the value, or `None` when undefined.
    pub fn value(&self) -> Option<f64> {
        if self.0.is_nan() {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.0.is_nan()
    }

    /// Formats the rate with the given number of decimals, or `no data`.
    pub fn format(&self, precision: usize) -> String {
        match self.value() {
            Some(v) => format!("{:.*}", precision, v),
            None => "no data".to_string(),
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(2))
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value() {
            Some(v) => serializer.serialize_some(&v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.map(Rate).unwrap_or(Rate::UNDEFINED))
    }
}

/// One group of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Group value, e.g. `Lithuania`, `1995`, `male` or `75+ years`.
    pub key: String,
    /// Sum of suicide counts within the group.
    pub suicides: u64,
    /// Sum of populations within the group.
    pub population: u64,
    pub rate: Rate,
}

/// Rates for every group of one dimension, in output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub group_key: GroupKey,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Looks up a row by its key label.
    pub fn get(&self, key: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Row with the highest defined rate; first one wins on ties.
    pub fn max_row(&self) -> Option<&SummaryRow> {
        let mut best: Option<&SummaryRow> = None;
        for row in self.defined_rows() {
            if best.map_or(true, |b| row.rate.raw() > b.rate.raw()) {
                best = Some(row);
            }
        }
        best
    }

    /// Row with the lowest defined rate; first one wins on ties.
    pub fn min_row(&self) -> Option<&SummaryRow> {
        let mut best: Option<&SummaryRow> = None;
        for row in self.defined_rows() {
            if best.map_or(true, |b| row.rate.raw() < b.rate.raw()) {
                best = Some(row);
            }
        }
        best
    }

    fn defined_rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|r| r.rate.is_defined())
    }
}

/// A table that could not be computed, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTable {
    pub group_key: GroupKey,
    pub error: String,
}

/// Headline figures shown above the tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    /// Country with the highest rate, and that rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_country: Option<(String, f64)>,
    /// How much higher the male rate is than the female rate, in percent of
    /// the female rate (e.g. `350.0` for 3.5x).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub male_to_female_percent: Option<f64>,
    /// Year with the highest rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_year: Option<(String, f64)>,
    /// Year with the lowest rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_year: Option<(String, f64)>,
    /// Age band with the highest rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_age_band: Option<(String, f64)>,
    /// First and last year covered by the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_range: Option<(i32, i32)>,
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the input dataset.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Number of records aggregated.
    pub records: usize,
    /// Rates are per this many people.
    pub per_population: u64,
    /// Version of the age-band order used.
    pub age_order_version: u32,
    pub duration_seconds: f64,
}

/// The complete report handed to the renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub metadata: ReportMetadata,
    pub highlights: Highlights,
    pub tables: Vec<SummaryTable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedTable>,
}
