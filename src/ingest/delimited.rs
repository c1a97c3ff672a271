//! Delimited text decoding.

use super::text_cell;
use crate::error::{AnalyzerError, Result};
use crate::models::{CellValue, Table};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read a delimited text file. The first record is the header.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let file = File::open(path).map_err(|e| AnalyzerError::unreadable(path, e))?;
    parse_delimited(BufReader::new(file), delimiter).map_err(|e| AnalyzerError::unreadable(path, e))
}

/// Parse delimited text from any reader.
///
/// Rows may be ragged. Columns whose every non-missing field parses as a
/// number are declared numeric; all others keep their text.
pub fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> std::result::Result<Table, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(text_cell).collect::<Vec<CellValue>>());
    }

    for idx in 0..headers.len() {
        promote_numeric_column(&mut rows, idx);
    }

    Ok(Table::new(headers, rows))
}

/// Convert column `idx` to numbers when every present field is numeric.
fn promote_numeric_column(rows: &mut [Vec<CellValue>], idx: usize) {
    let all_numeric = rows.iter().all(|row| match row.get(idx) {
        Some(CellValue::Text(s)) => s.trim().parse::<f64>().is_ok(),
        _ => true,
    });

    if !all_numeric {
        return;
    }

    for cell in rows.iter_mut().filter_map(|row| row.get_mut(idx)) {
        let parsed = match cell {
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(n) = parsed {
            *cell = CellValue::Number(n);
        }
    }
}
