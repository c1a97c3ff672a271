//! Data models for the fund analyzer.
//!
//! This module contains the generic table the decoders produce, the
//! combined (detail + subtotal) table the aggregator produces, and the
//! report wrapper handed to the output layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Source column holding the paying organization.
pub const ORGANIZATION_COLUMN: &str = "GENCO/ERD";
/// Source column holding the beneficiary.
pub const BENEFICIARY_COLUMN: &str = "BENEFICIARIES";
/// Source column holding the fund type code.
pub const FUND_COLUMN: &str = "FUND";
/// Source column holding the disbursed amount.
pub const AMOUNT_COLUMN: &str = "AMOUNT";
/// Optional source column used by the region filter.
pub const REGION_COLUMN: &str = "REGION";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    ORGANIZATION_COLUMN,
    BENEFICIARY_COLUMN,
    FUND_COLUMN,
    AMOUNT_COLUMN,
];

/// Fund types always exposed as output columns, in output order.
pub const DEFAULT_TARGET_FUNDS: [&str; 3] = ["EF", "DLF", "RWMHEEF"];

/// Beneficiary used when the source value is missing.
pub const UNKNOWN_BENEFICIARY: &str = "Unknown";
/// Beneficiary label of a subtotal row.
pub const TOTAL_LABEL: &str = "TOTAL";
/// Region selector that disables filtering.
pub const ALL_REGIONS: &str = "All Regions";

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value: empty field, empty cell or a spreadsheet error cell.
    Null,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Returns the cell rendered as a key string, or `None` for nulls.
    ///
    /// Integral numbers render without a fractional part so that an
    /// organization code stored as `101.0` in a workbook reads as `101`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Number(n) => Some(Cow::Owned(format_number(*n))),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Semantic type of a column, declared by the decoder from its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-null cell is text.
    Text,
    /// Every non-null cell is numeric.
    Number,
    /// Both text and numeric cells.
    Mixed,
    /// Only null cells.
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Number => write!(f, "number"),
            ColumnKind::Mixed => write!(f, "mixed"),
            ColumnKind::Empty => write!(f, "empty"),
        }
    }
}

/// A named column header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// An ordered collection of named columns and the rows beneath them.
///
/// Tables are never modified in place; filters return a new table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Builds a table, declaring each column's kind from its cells.
    ///
    /// Short rows are padded with nulls and long rows truncated so every
    /// row has exactly one cell per column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                name,
                kind: infer_kind(rows.iter().map(|row| &row[idx])),
            })
            .collect();

        Self { columns, rows }
    }

    /// Returns a table with the same columns and the given rows.
    pub fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of the column with exactly this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a CellValue>) -> ColumnKind {
    let mut has_text = false;
    let mut has_number = false;

    for cell in cells {
        match cell {
            CellValue::Null => {}
            CellValue::Text(_) => has_text = true,
            CellValue::Number(_) => has_number = true,
        }
    }

    match (has_text, has_number) {
        (true, true) => ColumnKind::Mixed,
        (true, false) => ColumnKind::Text,
        (false, true) => ColumnKind::Number,
        (false, false) => ColumnKind::Empty,
    }
}

/// Whether a combined-table row is a beneficiary detail or an
/// organization subtotal. Detail rows sort before subtotal rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKind {
    #[default]
    Detail,
    Subtotal,
}

/// One row of the combined table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    /// Paying organization.
    pub organization: String,
    /// Beneficiary, or `TOTAL` for subtotal rows.
    pub beneficiary: String,
    /// Detail or subtotal. Ordering only, never serialized.
    #[serde(skip)]
    pub kind: RowKind,
    /// One summed amount per target fund, in fund-column order.
    pub amounts: Vec<f64>,
}

impl CombinedRow {
    pub fn is_subtotal(&self) -> bool {
        self.kind == RowKind::Subtotal
    }

    /// Sum of this row's fund columns.
    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }
}

/// Detail rows and subtotal rows in final display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTable {
    /// Target fund codes, one output column each.
    pub fund_columns: Vec<String>,
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    /// Output header: organization, beneficiary, then one column per fund.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec![
            ORGANIZATION_COLUMN.to_string(),
            BENEFICIARY_COLUMN.to_string(),
        ];
        header.extend(self.fund_columns.iter().cloned());
        header
    }

    pub fn detail_rows(&self) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(|r| r.kind == RowKind::Detail)
    }

    pub fn subtotal_rows(&self) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(|r| r.kind == RowKind::Subtotal)
    }
}

#[cfg(test)]
impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

#[cfg(test)]
impl CombinedTable {
    pub fn fund_index(&self, fund: &str) -> Option<usize> {
        self.fund_columns.iter().position(|f| f == fund)
    }
}

/// Output of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub combined_table: CombinedTable,
    /// Number of detail rows.
    pub row_count: usize,
    /// Distinct organizations among detail rows.
    pub organization_count: usize,
    /// Distinct beneficiaries among detail rows.
    pub beneficiary_count: usize,
    /// Sum of every fund column over every detail row.
    pub total_amount: f64,
}

/// Metadata about one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Input artifact that was analyzed.
    pub input_path: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Region selector that was applied.
    pub region: String,
    /// Rows decoded from the input.
    pub input_rows: usize,
    /// Rows left after the region filter.
    pub filtered_rows: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub result: AnalysisResult,
}
