//! Fund Analyzer - Genco & Beneficiary Fund Analyzer
//!
//! A CLI tool that reads a disbursement sheet, pivots amounts per fund
//! type for every Genco/beneficiary pair with a TOTAL row per Genco, and
//! exports the combined table as CSV and XLSX.
//!
//! Exit codes:
//!   0 - Success (including "no valid data" without --fail-on-empty)
//!   1 - Runtime error (unreadable input, missing columns, export failure, etc.)
//!   2 - No valid data to analyze and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod pipeline;
mod report;

use analysis::{region_choices, Aggregator, RegionSelector};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, ReportFormat};
use config::Config;
use error::AnalyzerError;
use models::{Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
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

    // Load configuration before logging so `[general] verbose` applies
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            print_failure(&e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Fund Analyzer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_source(&source);

    match run_analysis(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            print_failure(&e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fund-analyzer.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize target funds, export names, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Print a failure with the hint that goes with it.
fn print_failure(e: &anyhow::Error) {
    match e.downcast_ref::<AnalyzerError>() {
        Some(AnalyzerError::MissingColumns(missing)) => {
            eprintln!(
                "\n❌ Missing required columns: {}",
                missing.missing.join(", ")
            );
            eprintln!("ℹ️  Found columns: {}", missing.found.join(", "));
        }
        Some(AnalyzerError::UnreadableInput { path, reason }) => {
            eprintln!("\n❌ Error reading file {}: {}", path.display(), reason);
            eprintln!("ℹ️  Tip: {}", error::UNREADABLE_HINT);
        }
        Some(AnalyzerError::Processing(msg)) => {
            eprintln!("\n❌ Error processing file: {}", msg);
            eprintln!("ℹ️  Please check your file format and try again.");
        }
        _ => eprintln!("\n❌ Error: {:#}", e),
    }
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config.validate()?;

    let input = args
        .input
        .clone()
        .context("No input file given (use --input)")?;

    // Step 1: Read the input
    println!("📁 Reading {}", input.display());
    let table = ingest::read_table(&input, &ingest::ReadOptions::from(&config.input))?;
    println!("✅ File loaded: {} rows", table.len());

    // Handle --list-regions: print selector choices and exit
    if args.list_regions {
        return handle_list_regions(&table);
    }

    // Step 2: Validate, filter and aggregate
    let region = config
        .analysis
        .default_region
        .parse::<RegionSelector>()
        .unwrap_or_default();
    let aggregator = Aggregator::new(config.analysis.target_funds.clone());

    println!("\n🔍 Region: {}", region);
    println!("💼 Funds: {}", aggregator.target_funds().join(", "));
    println!("🔬 Analyzing fund data...");

    let output = pipeline::run(&table, &region, &aggregator)?;

    let Some(result) = output.result else {
        warn!("No valid data to analyze after filtering");
        println!("\n⚠️  No valid data to analyze after filtering");
        return Ok(if args.fail_on_empty { 2 } else { 0 });
    };

    let symbol = config.export.currency_symbol.clone();

    // Step 3: Display
    println!("\n📈 Summary Statistics:");
    println!("{}", report::render_summary(&result, &symbol));
    println!("\n📋 Analysis Results:\n");
    println!("{}", report::render_table(&result.combined_table, &symbol));

    // Step 4: Export
    let output_dir = PathBuf::from(&config.general.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    println!("\n💾 Saving results...");
    if config.export.write_xlsx {
        let path = output_dir.join(&config.export.xlsx_file);
        report::save_xlsx(&result.combined_table, &path, &config.export.sheet_name)?;
        println!("   📥 Excel: {}", path.display());
    }
    if config.export.write_csv {
        let path = output_dir.join(&config.export.csv_file);
        report::save_csv(&result.combined_table, &path)?;
        println!("   📥 CSV: {}", path.display());
    }

    if let Some(format) = args.report {
        let metadata = ReportMetadata {
            input_path: input.display().to_string(),
            analysis_date: Utc::now(),
            region: region.to_string(),
            input_rows: table.len(),
            filtered_rows: output.filtered_rows,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };
        let report = Report { metadata, result };

        let content = match format {
            ReportFormat::Json => report::generate_json_report(&report)?,
            ReportFormat::Markdown => report::generate_markdown_report(&report, &symbol),
        };

        let path = output_dir.join(format!(
            "{}.{}",
            config.export.report_stem,
            format.extension()
        ));
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("   📝 Report: {}", path.display());
    }

    println!(
        "\n✅ Analysis complete in {:.2}s!",
        start_time.elapsed().as_secs_f64()
    );

    Ok(0)
}

/// Handle --list-regions: print the region selector choices.
fn handle_list_regions(table: &models::Table) -> Result<i32> {
    if table.position(models::REGION_COLUMN).is_none() {
        println!("\nℹ️  No REGION column found");
    }

    println!("\n🔍 Regions:");
    for choice in region_choices(table) {
        println!("   {}", choice);
    }

    Ok(0)
}

/// Where the active configuration came from.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    /// The default file exists but could not be loaded.
    Fallback(String),
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so the outcome is returned and
/// logged afterwards by [`log_config_source`].
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::DefaultFile),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::Fallback(format!("{:#}", e))),
    })
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::DefaultFile => info!("Loaded default config from {}", config::CONFIG_FILE),
        ConfigSource::Builtin => debug!("No config file found, using defaults"),
        ConfigSource::Fallback(reason) => warn!("Failed to load config: {}", reason),
    }
}
