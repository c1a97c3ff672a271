//! Fund aggregation and statistics.
//!
//! This module turns a flat disbursement table into the combined table:
//! one detail row per (organization, beneficiary) pair with a summed
//! amount per target fund, followed by one subtotal row per organization.

use crate::analysis::validator::ColumnMap;
use crate::models::{
    AnalysisResult, CellValue, CombinedRow, CombinedTable, RowKind, Table, DEFAULT_TARGET_FUNDS,
    TOTAL_LABEL, UNKNOWN_BENEFICIARY,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// A disbursement row that survived cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub organization: String,
    pub beneficiary: String,
    pub fund_type: String,
    pub amount: f64,
}

/// Pivots disbursements onto a fixed, ordered set of fund columns.
#[derive(Debug, Clone)]
pub struct Aggregator {
    target_funds: Vec<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FUNDS.iter().map(|f| f.to_string()).collect())
    }
}

impl Aggregator {
    pub fn new(target_funds: Vec<String>) -> Self {
        Self { target_funds }
    }

    pub fn target_funds(&self) -> &[String] {
        &self.target_funds
    }

    /// Analyze a table carrying the required columns.
    ///
    /// Returns `None` when no row survives cleaning. A table that fails
    /// column validation also yields `None`; callers validate first.
    pub fn analyze(&self, table: &Table) -> Option<AnalysisResult> {
        let columns = match ColumnMap::resolve(table) {
            Ok(columns) => columns,
            Err(e) => {
                warn!("Refusing to aggregate unvalidated table: {}", e);
                return None;
            }
        };

        let cleaned = clean_rows(table, &columns);
        debug!(
            "Cleaning kept {} of {} rows",
            cleaned.len(),
            table.rows.len()
        );

        if cleaned.is_empty() {
            return None;
        }

        let ignored = cleaned
            .iter()
            .filter(|r| !self.target_funds.contains(&r.fund_type))
            .count();
        if ignored > 0 {
            debug!("{} rows carry fund types outside the target set", ignored);
        }

        let details = self.pivot(&cleaned);
        let subtotals = subtotal_rows(&details, self.target_funds.len());
        let rows = combine(details, subtotals);

        Some(summarize(CombinedTable {
            fund_columns: self.target_funds.clone(),
            rows,
        }))
    }

    /// One detail row per (organization, beneficiary), ordered by that pair.
    ///
    /// Amounts for fund types outside the target set are discarded, but the
    /// pair itself still produces a (zero) detail row.
    fn pivot(&self, rows: &[CleanRow]) -> Vec<CombinedRow> {
        let width = self.target_funds.len();
        let mut grouped: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();

        for row in rows {
            let sums = grouped
                .entry((row.organization.as_str(), row.beneficiary.as_str()))
                .or_insert_with(|| vec![0.0; width]);

            if let Some(idx) = self.target_funds.iter().position(|f| *f == row.fund_type) {
                sums[idx] += row.amount;
            }
        }

        grouped
            .into_iter()
            .map(|((organization, beneficiary), amounts)| CombinedRow {
                organization: organization.to_string(),
                beneficiary: beneficiary.to_string(),
                kind: RowKind::Detail,
                amounts,
            })
            .collect()
    }
}

/// Analyze `table` against the default target funds.
#[allow(dead_code)] // Entry point for callers that keep the default fund set
pub fn analyze(table: &Table) -> Option<AnalysisResult> {
    Aggregator::default().analyze(table)
}

/// Drop rows missing organization, fund type or amount; default the
/// beneficiary; coerce amounts to numbers.
pub fn clean_rows(table: &Table, columns: &ColumnMap) -> Vec<CleanRow> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let organization = non_empty_text(&row[columns.organization])?;
            let fund_type = non_empty_text(&row[columns.fund_type])?;
            let amount = coerce_amount(&row[columns.amount])?;
            let beneficiary = non_empty_text(&row[columns.beneficiary])
                .unwrap_or_else(|| UNKNOWN_BENEFICIARY.to_string());

            Some(CleanRow {
                organization,
                beneficiary,
                fund_type,
                amount,
            })
        })
        .collect()
}

fn non_empty_text(cell: &CellValue) -> Option<String> {
    cell.as_text()
        .filter(|s| !s.is_empty())
        .map(|s| s.into_owned())
}

/// Numeric value of an amount cell.
///
/// `None` only for a missing value. Text that does not parse as a number
/// counts as zero.
pub fn coerce_amount(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Null => return None,
        CellValue::Number(n) => *n,
        CellValue::Text(s) if s.is_empty() => return None,
        CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    };

    Some(if value.is_nan() { 0.0 } else { value })
}

/// One subtotal row per organization, summing each fund column.
fn subtotal_rows(details: &[CombinedRow], width: usize) -> Vec<CombinedRow> {
    let mut totals: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for row in details {
        let sums = totals
            .entry(row.organization.as_str())
            .or_insert_with(|| vec![0.0; width]);
        for (sum, amount) in sums.iter_mut().zip(&row.amounts) {
            *sum += amount;
        }
    }

    totals
        .into_iter()
        .map(|(organization, amounts)| CombinedRow {
            organization: organization.to_string(),
            beneficiary: TOTAL_LABEL.to_string(),
            kind: RowKind::Subtotal,
            amounts,
        })
        .collect()
}

/// Concatenate and order: organization, then details before the
/// subtotal, then beneficiary. The sort is stable.
fn combine(details: Vec<CombinedRow>, subtotals: Vec<CombinedRow>) -> Vec<CombinedRow> {
    let mut rows = details;
    rows.extend(subtotals);

    rows.sort_by(|a, b| {
        a.organization
            .cmp(&b.organization)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.beneficiary.cmp(&b.beneficiary))
    });

    rows
}

/// Derive statistics from the detail rows of a combined table.
pub fn summarize(combined_table: CombinedTable) -> AnalysisResult {
    let (row_count, organization_count, beneficiary_count, total_amount) = {
        let mut organizations = HashSet::new();
        let mut beneficiaries = HashSet::new();
        let mut column_totals = vec![0.0_f64; combined_table.fund_columns.len()];
        let mut row_count = 0;

        for row in combined_table.detail_rows() {
            row_count += 1;
            organizations.insert(row.organization.as_str());
            beneficiaries.insert(row.beneficiary.as_str());
            for (total, amount) in column_totals.iter_mut().zip(&row.amounts) {
                *total += amount;
            }
        }

        let total_amount: f64 = column_totals.iter().sum();
        (row_count, organizations.len(), beneficiaries.len(), total_amount)
    };

    AnalysisResult {
        combined_table,
        row_count,
        organization_count,
        beneficiary_count,
        total_amount,
    }
}

/// Identify the organizations with the largest subtotal.
pub fn top_organizations(table: &CombinedTable, n: usize) -> Vec<(&str, f64)> {
    let mut totals: Vec<(&str, f64)> = table
        .subtotal_rows()
        .map(|row| (row.organization.as_str(), row.total()))
        .collect();

    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals.truncate(n);

    totals
}
