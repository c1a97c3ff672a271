//! Input decoding.
//!
//! Turns an uploaded artifact (delimited text or a spreadsheet workbook)
//! into the generic [`Table`] the analysis consumes. Any failure to decode
//! is reported as [`AnalyzerError::UnreadableInput`].

pub mod delimited;
pub mod workbook;

use crate::error::{AnalyzerError, Result};
use crate::models::{CellValue, Table};
use std::path::Path;
use tracing::{debug, info};

/// Values read as missing, matching common spreadsheet exports.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Decoder selected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited text with the given field separator.
    Delimited(u8),
    /// Spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
}

impl InputFormat {
    /// Detect the format from the file extension.
    ///
    /// `delimiter` applies to `.csv` and `.txt`; `.tsv` is always tab separated.
    pub fn detect(path: &Path, delimiter: u8) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Some(InputFormat::Delimited(delimiter)),
            "tsv" => Some(InputFormat::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(InputFormat::Workbook),
            _ => None,
        }
    }
}

/// Options for reading an input file.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Worksheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    /// Field separator for delimited text.
    pub delimiter: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            delimiter: b',',
        }
    }
}

impl From<&crate::config::InputConfig> for ReadOptions {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            sheet: config.sheet.clone(),
            delimiter: config.delimiter_byte(),
        }
    }
}

/// Read `path` into a table.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<Table> {
    if !path.is_file() {
        return Err(AnalyzerError::unreadable(path, "file not found"));
    }

    let format = InputFormat::detect(path, options.delimiter).ok_or_else(|| {
        AnalyzerError::unreadable(path, "unsupported file type (expected .xlsx, .xls or .csv)")
    })?;
    debug!("Reading {} as {:?}", path.display(), format);

    let table = match format {
        InputFormat::Delimited(delimiter) => delimited::read_delimited(path, delimiter)?,
        InputFormat::Workbook => workbook::read_workbook(path, options.sheet.as_deref())?,
    };

    info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    for column in &table.columns {
        debug!("Column '{}': {}", column.name, column.kind);
    }

    Ok(table)
}

/// Map a raw text field to a cell, treating NA markers as missing.
pub(crate) fn text_cell(raw: &str) -> CellValue {
    if NA_MARKERS.contains(&raw) {
        CellValue::Null
    } else {
        CellValue::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            InputFormat::detect(Path::new("data.csv"), b','),
            Some(InputFormat::Delimited(b','))
        );
        assert_eq!(
            InputFormat::detect(Path::new("data.CSV"), b';'),
            Some(InputFormat::Delimited(b';'))
        );
        assert_eq!(
            InputFormat::detect(Path::new("data.tsv"), b','),
            Some(InputFormat::Delimited(b'\t'))
        );
        assert_eq!(
            InputFormat::detect(Path::new("book.xlsx"), b','),
            Some(InputFormat::Workbook)
        );
        assert_eq!(
            InputFormat::detect(Path::new("book.xls"), b','),
            Some(InputFormat::Workbook)
        );
        assert_eq!(InputFormat::detect(Path::new("notes.pdf"), b','), None);
        assert_eq!(InputFormat::detect(Path::new("noext"), b','), None);
    }

    #[test]
    fn test_text_cell_na_markers() {
        assert_eq!(text_cell(""), CellValue::Null);
        assert_eq!(text_cell("N/A"), CellValue::Null);
        assert_eq!(text_cell("nan"), CellValue::Null);
        assert_eq!(text_cell("BenA"), CellValue::Text("BenA".to_string()));
    }

    #[test]
    fn test_read_table_missing_file() {
        let err = read_table(Path::new("/nonexistent/input.csv"), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::UnreadableInput { .. }));
    }

    #[test]
    fn test_read_table_unsupported_extension() {
        let mut file = Builder::new().suffix(".pdf").tempfile().unwrap();
        writeln!(file, "not a table").unwrap();

        let err = read_table(file.path(), &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn test_read_table_corrupt_workbook() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "this is not a zip archive").unwrap();

        let err = read_table(file.path(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnreadableInput { .. }));
    }

    #[test]
    fn test_read_table_csv() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "GENCO/ERD,BENEFICIARIES,FUND,AMOUNT").unwrap();
        writeln!(file, "GencoX,BenA,EF,100").unwrap();

        let table = read_table(file.path(), &ReadOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.column_names(),
            vec!["GENCO/ERD", "BENEFICIARIES", "FUND", "AMOUNT"]
        );
    }
}
