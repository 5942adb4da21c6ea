//! Report generation.
//!
//! This module renders the summary tables as a Markdown or JSON report.
//! Undefined rates are shown as `no data` in Markdown and `null` in JSON.

use crate::analysis::ranked_rows;
use crate::models::{FailedTable, GroupKey, Highlights, Report, ReportMetadata, SummaryTable};
use anyhow::Result;

/// Rendering options for the Markdown report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Decimal places for rates.
    pub precision: usize,
    /// Show the highlights section.
    pub include_highlights: bool,
    /// Show summed counts and populations.
    pub include_totals: bool,
    /// Rows in the "highest rates" ranking of the country table.
    pub top: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            include_highlights: true,
            include_totals: true,
            top: 10,
        }
    }
}

impl From<&crate::config::ReportConfig> for RenderOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            precision: config.precision,
            include_highlights: config.include_highlights,
            include_totals: config.include_totals,
            top: config.top,
        }
    }
}

/// Header of the rate column.
fn rate_header(per_population: u64) -> String {
    if per_population == 100_000 {
        "Suicide Rate (per 100k)".to_string()
    } else {
        format!("Suicide Rate (per {})", per_population)
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.title));
    output.push_str(&generate_metadata_section(&report.metadata));

    if options.include_highlights {
        output.push_str(&generate_highlights_section(
            &report.highlights,
            options.precision,
        ));
    }

    for table in &report.tables {
        output.push_str(&generate_table_section(
            table,
            report.metadata.per_population,
            options,
        ));
    }

    output.push_str(&generate_failed_section(&report.failed));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.records));
    section.push_str(&format!(
        "- **Rates:** per {} population\n",
        metadata.per_population
    ));
    section.push_str(&format!(
        "- **Age Order Version:** {}\n",
        metadata.age_order_version
    ));
    section.push_str(&format!(
        "- **Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the highlights section.
fn generate_highlights_section(highlights: &Highlights, precision: usize) -> String {
    if highlights.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Highlights\n\n");
    for line in highlights.lines(precision) {
        section.push_str(&format!("- {}\n", line));
    }
    section.push('\n');

    section
}

/// Generate the section for one summary table.
fn generate_table_section(
    table: &SummaryTable,
    per_population: u64,
    options: &RenderOptions,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", table.group_key.title()));

    if table.rows.is_empty() {
        section.push_str("No data.\n\n");
        return section;
    }

    if table.group_key == GroupKey::Country && options.top > 0 {
        let top = ranked_rows(table, options.top);
        if !top.is_empty() {
            section.push_str("### Highest Rates\n\n");
            for (i, row) in top.iter().enumerate() {
                section.push_str(&format!(
                    "{}. {} ({})\n",
                    i + 1,
                    row.key,
                    row.rate.format(options.precision)
                ));
            }
            section.push('\n');
        }
    }

    let label = table.group_key.column_label();
    let rate = rate_header(per_population);

    if options.include_totals {
        section.push_str(&format!("| {} | {} | Suicides | Population |\n", label, rate));
        section.push_str("|:---|---:|---:|---:|\n");
        for row in &table.rows {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.key,
                row.rate.format(options.precision),
                row.suicides,
                row.population
            ));
        }
    } else {
        section.push_str(&format!("| {} | {} |\n", label, rate));
        section.push_str("|:---|---:|\n");
        for row in &table.rows {
            section.push_str(&format!(
                "| {} | {} |\n",
                row.key,
                row.rate.format(options.precision)
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the section listing tables that could not be computed.
fn generate_failed_section(failed: &[FailedTable]) -> String {
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Tables Not Computed\n\n");
    for f in failed {
        section.push_str(&format!("- **{}**: {}\n", f.group_key.title(), f.error));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by suicide-rates*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rate, SummaryRow, AGE_BAND_ORDER_VERSION};
    use chrono::Utc;

    fn row(key: &str, suicides: u64, population: u64) -> SummaryRow {
        SummaryRow {
            key: key.to_string(),
            suicides,
            population,
            rate: Rate::compute(suicides, population, 100_000),
        }
    }

    fn create_test_report() -> Report {
        Report {
            title: "Exploration of Suicide Data (1985-2016)".to_string(),
            metadata: ReportMetadata {
                source: "master.csv".to_string(),
                generated_at: Utc::now(),
                records: 12,
                per_population: 100_000,
                age_order_version: AGE_BAND_ORDER_VERSION,
                duration_seconds: 0.01,
            },
            highlights: Highlights {
                highest_country: Some(("Lithuania".to_string(), 41.18)),
                ..Highlights::default()
            },
            tables: vec![
                SummaryTable {
                    group_key: GroupKey::Country,
                    rows: vec![row("Albania", 3, 100_000), row("Lithuania", 41, 100_000)],
                },
                SummaryTable {
                    group_key: GroupKey::AgeBand,
                    rows: vec![row("5-14 years", 1, 100_000), row("25-34 years", 0, 0)],
                },
            ],
            failed: vec![FailedTable {
                group_key: GroupKey::Sex,
                error: "invalid category order".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("# Exploration of Suicide Data (1985-2016)"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Highlights"));
        assert!(markdown.contains("## Suicide Rate Across Countries"));
        assert!(markdown.contains("| Country Name | Suicide Rate (per 100k) |"));
        assert!(markdown.contains("## By Age Group"));
        assert!(markdown.contains("| 25-34 years | no data | 0 | 0 |"));
        assert!(markdown.contains("## Tables Not Computed"));
    }

    #[test]
    fn test_ranking_lists_highest_first() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("1. Lithuania (41.00)"));
        assert!(markdown.contains("2. Albania (3.00)"));
    }

    #[test]
    fn test_markdown_without_totals_or_highlights() {
        let report = create_test_report();
        let options = RenderOptions {
            include_totals: false,
            include_highlights: false,
            precision: 1,
            top: 0,
        };
        let markdown = generate_markdown_report(&report, &options);

        assert!(!markdown.contains("## Highlights"));
        assert!(!markdown.contains("### Highest Rates"));
        assert!(!markdown.contains("| Suicides |"));
        assert!(markdown.contains("| Lithuania | 41.0 |"));
    }

    #[test]
    fn test_rate_header() {
        assert_eq!(rate_header(100_000), "Suicide Rate (per 100k)");
        assert_eq!(rate_header(1_000), "Suicide Rate (per 1000)");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"tables\""));
        assert!(json.contains("\"age_band\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let age_rows = &value["tables"][1]["rows"];
        assert!(age_rows[1]["rate"].is_null());
        let rate = age_rows[0]["rate"].as_f64().unwrap();
        assert!((rate - 1.0).abs() < 1e-9);
    }
}
