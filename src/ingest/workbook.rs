//! Spreadsheet workbook decoding.

use super::text_cell;
use crate::error::{AnalyzerError, Result};
use crate::models::{CellValue, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

/// Read one worksheet of a workbook. The first row is the header.
///
/// Reads `sheet` when given, otherwise the first worksheet.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| AnalyzerError::unreadable(path, e))?;

    let sheet_names = workbook.sheet_names();
    let name = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(AnalyzerError::unreadable(
                path,
                format!(
                    "worksheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ),
            ))
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| AnalyzerError::unreadable(path, "workbook has no worksheets"))?,
    };
    debug!("Reading worksheet '{}'", name);

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| AnalyzerError::unreadable(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| convert_cell(c).to_string()).collect(),
        None => return Ok(Table::default()),
    };

    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(Table::new(headers, rows))
}

/// Map a workbook cell onto the generic cell model.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => text_cell(s),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnKind;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("funds.xlsx");
        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").unwrap();
        summary.write_string(0, 0, "ignored").unwrap();

        let data = workbook.add_worksheet();
        data.set_name("Data").unwrap();
        for (col, header) in ["GENCO/ERD", "BENEFICIARIES", "FUND", "AMOUNT"]
            .iter()
            .enumerate()
        {
            data.write_string(0, col as u16, *header).unwrap();
        }
        data.write_number(1, 0, 101.0).unwrap();
        data.write_string(1, 1, "BenA").unwrap();
        data.write_string(1, 2, "EF").unwrap();
        data.write_number(1, 3, 250.75).unwrap();
        // Beneficiary left empty on the second row
        data.write_number(2, 0, 102.0).unwrap();
        data.write_string(2, 2, "DLF").unwrap();
        data.write_number(2, 3, 10.0).unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_named_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let table = read_workbook(&path, Some("Data")).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["GENCO/ERD", "BENEFICIARIES", "FUND", "AMOUNT"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0].as_text().as_deref(), Some("101"));
        assert_eq!(table.rows[0][3], CellValue::Number(250.75));
        assert!(table.rows[1][1].is_null());
        assert_eq!(table.columns[3].kind, ColumnKind::Number);
    }

    #[test]
    fn test_first_sheet_by_default() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let table = read_workbook(&path, None).unwrap();
        assert_eq!(table.column_names(), vec!["ignored"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let err = read_workbook(&path, Some("Missing")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("worksheet 'Missing' not found"));
        assert!(msg.contains("Summary, Data"));
    }

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
        assert_eq!(convert_cell(&Data::Int(5)), CellValue::Number(5.0));
        assert_eq!(
            convert_cell(&Data::String("EF".to_string())),
            CellValue::Text("EF".to_string())
        );
        assert_eq!(convert_cell(&Data::String("#N/A".to_string())), CellValue::Null);
    }
}
