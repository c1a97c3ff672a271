//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fund-analyzer.toml` files.

use crate::models::{ALL_REGIONS, DEFAULT_TARGET_FUNDS};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".fund-analyzer.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input decoding settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the export artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Input decoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Worksheet to read from workbooks (first sheet when unset).
    #[serde(default)]
    pub sheet: Option<String>,

    /// Field separator for delimited text.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            delimiter: default_delimiter(),
        }
    }
}

impl InputConfig {
    /// Delimiter as a byte. Only meaningful once [`Config::validate`] passed.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}

/// Whether `c` can separate fields of delimited text.
pub fn is_valid_delimiter(c: char) -> bool {
    c.is_ascii() && c != '"' && c != '\n' && c != '\r'
}

fn default_delimiter() -> char {
    ','
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Fund types exposed as output columns, in order.
    #[serde(default = "default_target_funds")]
    pub target_funds: Vec<String>,

    /// Region selector used when `--region` is not given.
    #[serde(default = "default_region")]
    pub default_region: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_funds: default_target_funds(),
            default_region: default_region(),
        }
    }
}

fn default_target_funds() -> Vec<String> {
    DEFAULT_TARGET_FUNDS.iter().map(|f| f.to_string()).collect()
}

fn default_region() -> String {
    ALL_REGIONS.to_string()
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Delimited-text artifact file name.
    #[serde(default = "default_csv_file")]
    pub csv_file: String,

    /// Workbook artifact file name.
    #[serde(default = "default_xlsx_file")]
    pub xlsx_file: String,

    /// Worksheet name inside the workbook artifact.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Report file name without extension.
    #[serde(default = "default_report_stem")]
    pub report_stem: String,

    /// Write the delimited-text artifact.
    #[serde(default = "default_true")]
    pub write_csv: bool,

    /// Write the workbook artifact.
    #[serde(default = "default_true")]
    pub write_xlsx: bool,

    /// Currency symbol used for display only.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_file: default_csv_file(),
            xlsx_file: default_xlsx_file(),
            sheet_name: default_sheet_name(),
            report_stem: default_report_stem(),
            write_csv: true,
            write_xlsx: true,
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_csv_file() -> String {
    "fund_analysis.csv".to_string()
}

fn default_xlsx_file() -> String {
    "fund_analysis.xlsx".to_string()
}

fn default_sheet_name() -> String {
    "Analysis".to_string()
}

fn default_report_stem() -> String {
    "fund_analysis_report".to_string()
}

fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "₱".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when the CLI provides an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.display().to_string();
        }
        if let Some(ref sheet) = args.sheet {
            self.input.sheet = Some(sheet.clone());
        }
        if let Some(delimiter) = args.delimiter {
            self.input.delimiter = delimiter;
        }
        if let Some(ref region) = args.region {
            self.analysis.default_region = region.clone();
        }

        // Flags only ever switch things off / on
        if args.no_csv {
            self.export.write_csv = false;
        }
        if args.no_xlsx {
            self.export.write_xlsx = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check settings that serde alone cannot enforce.
    ///
    /// Runs after [`Config::merge_with_args`], so file and CLI values are
    /// held to the same rules.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_delimiter(self.input.delimiter) {
            bail!(
                "input.delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.input.delimiter
            );
        }

        let funds = &self.analysis.target_funds;
        if funds.is_empty() {
            bail!("analysis.target_funds must name at least one fund type");
        }

        let mut seen = HashSet::new();
        for fund in funds {
            if !seen.insert(fund.as_str()) {
                bail!("analysis.target_funds lists {:?} more than once", fund);
            }
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.target_funds, vec!["EF", "DLF", "RWMHEEF"]);
        assert_eq!(config.analysis.default_region, "All Regions");
        assert_eq!(config.export.sheet_name, "Analysis");
        assert_eq!(config.export.csv_file, "fund_analysis.csv");
        assert_eq!(config.input.delimiter_byte(), b',');
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
verbose = true

[input]
sheet = "Data"
delimiter = ";"

[analysis]
target_funds = ["EF", "DLF"]

[export]
write_xlsx = false
currency_symbol = "$"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.input.sheet.as_deref(), Some("Data"));
        assert_eq!(config.input.delimiter_byte(), b';');
        assert_eq!(config.analysis.target_funds, vec!["EF", "DLF"]);
        assert_eq!(config.analysis.default_region, "All Regions");
        assert!(!config.export.write_xlsx);
        assert!(config.export.write_csv);
        assert_eq!(config.export.currency_symbol, "$");
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_delimiter_from_file() {
        for delimiter in ["§", "\"", "\n"] {
            let toml_content = format!("[input]\ndelimiter = {:?}\n", delimiter);
            let config: Config = toml::from_str(&toml_content).unwrap();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("input.delimiter"));
        }
    }

    #[test]
    fn test_validate_rejects_empty_target_funds() {
        let mut config = Config::default();
        config.analysis.target_funds.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_target_funds() {
        let config: Config = toml::from_str(
            r#"
[analysis]
target_funds = ["EF", "DLF", "EF"]
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("\"EF\" more than once"));
    }

    #[test]
    fn test_verbose_from_file_survives_merge() {
        use clap::Parser;

        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = crate::cli::Args::try_parse_from(["fund-analyzer", "--input", "funds.csv"])
            .unwrap();
        config.merge_with_args(&args);
        assert!(config.general.verbose);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[export]"));
    }
}
