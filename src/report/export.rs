//! Downloadable artifacts.
//!
//! Both artifacts carry exactly the combined table: same rows, same order,
//! same columns, raw numbers without currency formatting.

use crate::error::{AnalyzerError, Result};
use crate::models::CombinedTable;
use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write the combined table as delimited text.
pub fn write_csv<W: Write>(table: &CombinedTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(table.header())?;
    for row in &table.rows {
        let mut record = vec![row.organization.clone(), row.beneficiary.clone()];
        record.extend(row.amounts.iter().map(|a| a.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;

    Ok(())
}

/// Delimited text as UTF-8 bytes.
pub fn csv_bytes(table: &CombinedTable) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(buffer)
}

/// Build a workbook with a single sheet holding the combined table.
fn build_workbook(table: &CombinedTable, sheet_name: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.header().iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, name, &header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(idx + 1)
            .map_err(|_| AnalyzerError::Export("too many rows for a worksheet".to_string()))?;

        worksheet.write_string(r, 0, &row.organization)?;
        worksheet.write_string(r, 1, &row.beneficiary)?;
        for (offset, amount) in row.amounts.iter().enumerate() {
            worksheet.write_number(r, column_index(offset + 2)?, *amount)?;
        }
    }

    Ok(workbook)
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col)
        .map_err(|_| AnalyzerError::Export("too many columns for a worksheet".to_string()))
}

/// Workbook as XLSX bytes.
pub fn xlsx_bytes(table: &CombinedTable, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

/// Save the delimited-text artifact.
pub fn save_csv(table: &CombinedTable, path: &Path) -> Result<()> {
    let bytes = csv_bytes(table)?;
    std::fs::write(path, bytes)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Save the workbook artifact.
pub fn save_xlsx(table: &CombinedTable, path: &Path, sheet_name: &str) -> Result<()> {
    let bytes = xlsx_bytes(table, sheet_name)?;
    std::fs::write(path, bytes)?;
    info!("Wrote {}", path.display());
    Ok(())
}
