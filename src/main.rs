//! suicide-rates - suicide statistics aggregation CLI
//!
//! Loads a suicide statistics CSV, computes rate tables by country, year,
//! sex and age group, and writes a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, config, schema error, etc.)
//!   2 - Report written, but at least one table could not be computed

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use suicide_rates::analysis::{self, AggregationSettings};
use suicide_rates::cli::{Args, OutputFormat};
use suicide_rates::config::{Config, CONFIG_FILE_NAME};
use suicide_rates::dataset::{DatasetLoader, LoadConfig, Table};
use suicide_rates::models::{Highlights, Report, ReportMetadata, AGE_BAND_ORDER_VERSION};
use suicide_rates::report::{self, RenderOptions};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("suicide-rates v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .suicide-rates.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize columns, age order, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Checked by Args::validate unless --init-config was given
    let input = args
        .input
        .clone()
        .context("No input file given (use --input)")?;

    // Step 1: Load the dataset
    if !args.quiet {
        println!("📥 Loading dataset: {}", input.display());
    }
    let loader = DatasetLoader::new(LoadConfig::try_from(&config.dataset)?);
    let table = loader.load(&input)?;

    if args.dry_run {
        return handle_dry_run(&table, &config);
    }

    // Step 2: Aggregate
    if !args.quiet {
        println!("🔬 Computing rate tables...");
    }
    let settings = AggregationSettings::from(&config);
    let summaries = analysis::summarize(&table, &settings)
        .with_context(|| format!("Cannot aggregate {}", input.display()))?;

    // Step 3: Build the report
    let highlights = Highlights::from_summaries(&summaries);

    let metadata = ReportMetadata {
        source: input.display().to_string(),
        generated_at: Utc::now(),
        records: summaries.records,
        per_population: settings.per_population,
        age_order_version: AGE_BAND_ORDER_VERSION,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let report = Report {
        title: config.title_for(summaries.year_range),
        metadata,
        highlights,
        tables: summaries.tables.clone(),
        failed: summaries.failed.clone(),
    };

    // Step 4: Render and save
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &RenderOptions::from(&config.report))
        }
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Records: {}", summaries.records);
        for summary in &summaries.tables {
            let undefined = summary.rows.iter().filter(|r| !r.rate.is_defined()).count();
            println!(
                "   - {}: {} rows ({} without data)",
                summary.group_key.title(),
                summary.rows.len(),
                undefined
            );
        }
        for line in report.highlights.lines(config.report.precision) {
            println!("   ★ {}", line.replace("**", ""));
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if !summaries.failed.is_empty() {
        for failed in &summaries.failed {
            eprintln!("⛔ {} not computed: {}", failed.group_key.title(), failed.error);
        }
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: validate the dataset, print its shape, exit.
fn handle_dry_run(table: &Table, config: &Config) -> Result<i32> {
    let shape = table.describe();

    println!("\n🔍 Dry run: validating dataset (no report written)...\n");
    println!("   Rows: {}", shape.rows);
    println!("   Columns: {}", shape.columns.join(", "));

    let records = analysis::extract_records(table, &config.dataset.columns)?;
    let years = analysis::year_range(&records);

    println!("   Valid records: {}", records.len());
    if let Some((start, end)) = years {
        println!("   Years: {}-{}", start, end);
    }

    let settings = AggregationSettings::from(config);
    for key in &settings.keys {
        if let Some(order) = settings.category_order(*key) {
            if let Err(e) = analysis::validate_category_order(*key, order) {
                warn!("{}", e);
                println!("   ⚠️  {}", e);
            }
        }
    }

    println!("\n✅ Dry run complete. No report was written.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
