//! Aggregation engine.
//!
//! Turns a loaded dataset into per-dimension rate tables and the headline
//! figures derived from them.

pub mod aggregator;
pub mod error;
pub mod highlights;
pub mod schema;

pub use aggregator::*;
pub use error::AggregationError;
pub use schema::{extract_records, ColumnMapping};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetLoader, LoadConfig};
    use crate::models::{GroupKey, Highlights, AGE_BAND_ORDER};
    use std::path::Path;

    fn fixture_summaries() -> Summaries {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/master_sample.csv");
        let table = DatasetLoader::new(LoadConfig::default())
            .load(&path)
            .unwrap();
        summarize(&table, &AggregationSettings::default()).unwrap()
    }

    #[test]
    fn test_fixture_country_table() {
        let summaries = fixture_summaries();
        let country = summaries.table(GroupKey::Country).unwrap();

        let keys: Vec<&str> = country.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Albania", "Lithuania"]);

        let albania = country.get("Albania").unwrap();
        assert_eq!(albania.suicides, 78);
        assert_eq!(albania.population, 2_725_000);
        let expected = 78.0 / 2_725_000.0 * 100_000.0;
        assert!((albania.rate.raw() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fixture_sex_and_age_tables() {
        let summaries = fixture_summaries();

        let sex = summaries.table(GroupKey::Sex).unwrap();
        assert_eq!(sex.rows[0].key, "male");
        assert_eq!(sex.rows[0].suicides, 1_368);
        assert_eq!(sex.rows[0].population, 3_090_900);
        assert_eq!(sex.rows[1].key, "female");
        assert_eq!(sex.rows[1].suicides, 291);
        assert_eq!(sex.rows[1].population, 3_229_100);

        let age = summaries.table(GroupKey::AgeBand).unwrap();
        let keys: Vec<&str> = age.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, AGE_BAND_ORDER.to_vec());

        let total: u64 = age.rows.iter().map(|r| r.suicides).sum();
        assert_eq!(total, 1_659);
    }

    #[test]
    fn test_fixture_highlights() {
        let summaries = fixture_summaries();
        let highlights = Highlights::from_summaries(&summaries);

        assert_eq!(summaries.year_range, Some((1987, 1995)));
        assert_eq!(
            highlights.highest_country.map(|(c, _)| c),
            Some("Lithuania".to_string())
        );
        assert_eq!(highlights.peak_year.map(|(y, _)| y), Some("1995".to_string()));
        assert_eq!(
            highlights.highest_age_band.map(|(a, _)| a),
            Some("75+".to_string())
        );
    }
}
