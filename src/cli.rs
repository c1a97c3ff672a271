//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Fund Analyzer - Genco & beneficiary fund analysis
///
/// Reads a disbursement sheet (CSV or Excel), pivots amounts per fund
/// type for every Genco/beneficiary pair, adds a TOTAL row per Genco and
/// exports the result as CSV and XLSX.
///
/// Required columns: GENCO/ERD, BENEFICIARIES, FUND, AMOUNT (REGION optional)
///
/// Examples:
///   fund-analyzer --input funds.xlsx
///   fund-analyzer --input funds.csv --region "Region VII" --output-dir out
///   fund-analyzer --input funds.xlsx --list-regions
///   fund-analyzer --input funds.csv --report markdown --no-xlsx
///   fund-analyzer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input file to analyze (.xlsx, .xls, .csv)
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Region to analyze
    ///
    /// Use "All Regions" (the default) to disable filtering. Matching is
    /// exact and case-sensitive.
    #[arg(short, long, value_name = "REGION", env = "FUND_ANALYZER_REGION")]
    pub region: Option<String>,

    /// Print the available regions and exit
    #[arg(long)]
    pub list_regions: bool,

    /// Directory for the exported files
    ///
    /// Defaults to the current directory or the config file setting.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Worksheet to read from an Excel workbook (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Field delimiter for CSV input
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Do not write the CSV export
    #[arg(long)]
    pub no_csv: bool,

    /// Do not write the XLSX export
    #[arg(long)]
    pub no_xlsx: bool,

    /// Also write a report in this format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub report: Option<ReportFormat>,

    /// Exit with code 2 when there is no valid data to analyze
    ///
    /// Useful in scripts. Without this flag an empty result is a warning.
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fund-analyzer.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fund-analyzer.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Format for the optional report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Markdown report
    Markdown,
    /// JSON report
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !crate::config::is_valid_delimiter(delimiter) {
                return Err(format!(
                    "Delimiter must be a single ASCII character other than quote or newline, got {:?}",
                    delimiter
                ));
            }
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet`
    /// overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
