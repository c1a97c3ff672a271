//! Error types for the analysis pipeline.
//!
//! The core never panics or throws across its boundary: every failure is an
//! [`AnalyzerError`] value. An empty result is not an error and is modelled
//! as `None` by the aggregator instead.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Hint shown alongside undecodable input.
pub const UNREADABLE_HINT: &str = "Try converting your Excel file to CSV format and upload again";

/// One or more required columns are absent from the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumns {
    /// Required column names that were not found, in required order.
    pub missing: Vec<String>,
    /// Every column actually present, in table order.
    pub found: Vec<String>,
}

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing required columns: {} (found columns: {})",
            self.missing.join(", "),
            self.found.join(", ")
        )
    }
}

impl std::error::Error for MissingColumns {}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error(transparent)]
    MissingColumns(#[from] MissingColumns),

    #[error("Error reading file {}: {reason}. {}", path.display(), UNREADABLE_HINT)]
    UnreadableInput { path: PathBuf, reason: String },

    #[error("Error processing file: {0}")]
    Processing(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AnalyzerError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        AnalyzerError::UnreadableInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(err: csv::Error) -> Self {
        AnalyzerError::Export(format!("CSV write failed: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AnalyzerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AnalyzerError::Export(format!("XLSX write failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
