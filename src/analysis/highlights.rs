//! Headline figures derived from the summary tables.

use super::aggregator::Summaries;
use crate::models::{AgeBand, GroupKey, Highlights, SummaryRow};

impl Highlights {
    /// Derive highlights from computed tables. Undefined rates are ignored and
    /// a highlight is left empty when its table is missing.
    pub fn from_summaries(summaries: &Summaries) -> Self {
        let row_pair = |row: &SummaryRow| row.rate.value().map(|v| (row.key.clone(), v));

        let highest_country = summaries
            .table(GroupKey::Country)
            .and_then(|t| t.max_row())
            .and_then(row_pair);

        let peak_year = summaries
            .table(GroupKey::Year)
            .and_then(|t| t.max_row())
            .and_then(row_pair);

        let lowest_year = summaries
            .table(GroupKey::Year)
            .and_then(|t| t.min_row())
            .and_then(row_pair);

        let highest_age_band = summaries
            .table(GroupKey::AgeBand)
            .and_then(|t| t.max_row())
            .and_then(|row| {
                let label = row
                    .key
                    .parse::<AgeBand>()
                    .map(|band| band.short_label().to_string())
                    .unwrap_or_else(|_| row.key.clone());
                row.rate.value().map(|v| (label, v))
            });

        let male_to_female_percent = summaries.table(GroupKey::Sex).and_then(|t| {
            let male = t.get("male")?.rate.value()?;
            let female = t.get("female")?.rate.value()?;
            if female > 0.0 {
                Some(male / female * 100.0)
            } else {
                None
            }
        });

        Self {
            highest_country,
            male_to_female_percent,
            peak_year,
            lowest_year,
            highest_age_band,
            year_range: summaries.year_range,
        }
    }

    /// Whether there is anything to show.
    pub fn is_empty(&self) -> bool {
        self.highest_country.is_none()
            && self.male_to_female_percent.is_none()
            && self.peak_year.is_none()
            && self.lowest_year.is_none()
            && self.highest_age_band.is_none()
    }

    /// Human readable highlight lines, one per available figure.
    pub fn lines(&self, precision: usize) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some((ref country, rate)) = self.highest_country {
            lines.push(format!(
                "**{}**: country with the highest suicide rate ({:.*})",
                country, precision, rate
            ));
        }
        if let Some(percent) = self.male_to_female_percent {
            lines.push(format!(
                "**{:.0}%**: male suicide rate relative to the female rate",
                percent
            ));
        }
        if let Some((ref year, rate)) = self.peak_year {
            lines.push(format!(
                "**{}**: year with the highest suicide rate ({:.*})",
                year, precision, rate
            ));
        }
        if let Some((ref year, rate)) = self.lowest_year {
            lines.push(format!(
                "**{}**: year with the lowest suicide rate ({:.*})",
                year, precision, rate
            ));
        }
        if let Some((ref band, rate)) = self.highest_age_band {
            lines.push(format!(
                "**{}**: age group with the highest suicide rate ({:.*})",
                band, precision, rate
            ));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailedTable, Rate, SummaryTable, DEFAULT_PER_POPULATION};

    fn row(key: &str, suicides: u64, population: u64) -> SummaryRow {
        SummaryRow {
            key: key.to_string(),
            suicides,
            population,
            rate: Rate::compute(suicides, population, DEFAULT_PER_POPULATION),
        }
    }

    fn summaries() -> Summaries {
        Summaries {
            records: 10,
            year_range: Some((1985, 2016)),
            tables: vec![
                SummaryTable {
                    group_key: GroupKey::Country,
                    rows: vec![row("Albania", 3, 100_000), row("Lithuania", 41, 100_000)],
                },
                SummaryTable {
                    group_key: GroupKey::Year,
                    rows: vec![
                        row("1985", 12, 100_000),
                        row("1995", 15, 100_000),
                        row("2015", 11, 100_000),
                        row("2016", 0, 0),
                    ],
                },
                SummaryTable {
                    group_key: GroupKey::Sex,
                    rows: vec![row("male", 21, 100_000), row("female", 6, 100_000)],
                },
                SummaryTable {
                    group_key: GroupKey::AgeBand,
                    rows: vec![
                        row("5-14 years", 1, 100_000),
                        row("75+ years", 23, 100_000),
                        row("55-74 years", 0, 0),
                    ],
                },
            ],
            failed: Vec::new(),
        }
    }

    #[test]
    fn test_highlights_from_summaries() {
        let highlights = Highlights::from_summaries(&summaries());

        assert_eq!(
            highlights.highest_country.as_ref().map(|(c, _)| c.as_str()),
            Some("Lithuania")
        );
        assert_eq!(
            highlights.peak_year.as_ref().map(|(y, _)| y.as_str()),
            Some("1995")
        );
        assert_eq!(
            highlights.lowest_year.as_ref().map(|(y, _)| y.as_str()),
            Some("2015")
        );
        assert_eq!(
            highlights.highest_age_band.as_ref().map(|(a, _)| a.as_str()),
            Some("75+")
        );
        assert_eq!(highlights.year_range, Some((1985, 2016)));

        let percent = highlights.male_to_female_percent.unwrap();
        assert!((percent - 350.0).abs() < 1e-9);
        assert!(!highlights.is_empty());
    }

    #[test]
    fn test_highlights_with_missing_tables() {
        let mut s = summaries();
        s.tables.retain(|t| t.group_key != GroupKey::AgeBand);
        s.failed.push(FailedTable {
            group_key: GroupKey::AgeBand,
            error: "bad order".to_string(),
        });

        let highlights = Highlights::from_summaries(&s);
        assert!(highlights.highest_age_band.is_none());
        assert!(highlights.highest_country.is_some());
    }

    #[test]
    fn test_highlights_zero_female_rate() {
        let mut s = summaries();
        s.tables[2].rows[1] = row("female", 0, 100_000);

        let highlights = Highlights::from_summaries(&s);
        assert!(highlights.male_to_female_percent.is_none());
    }

    #[test]
    fn test_highlight_lines() {
        let lines = Highlights::from_summaries(&summaries()).lines(2);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Lithuania"));
        assert!(lines[0].contains("41.00"));
        assert!(lines[1].contains("350%"));
    }
}
