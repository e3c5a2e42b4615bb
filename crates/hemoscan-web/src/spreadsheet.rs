//! Upload decoding: workbook or CSV bytes → loosely typed [`Table`].
//!
//! The first row is the header. Workbooks are read from their first sheet
//! and the container format (xlsx, xlsm, xlsb, xls, ods) is detected from
//! the bytes. CSV is chosen only by a `.csv` file name.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;
use tracing::debug;

use hemoscan_common::{CellValue, Table};

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("{0}")]
    Workbook(#[from] calamine::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("no columns to parse from file")]
    Empty,
}

/// Decode an uploaded file.
pub fn parse_upload(file_name: Option<&str>, bytes: &[u8]) -> Result<Table, SpreadsheetError> {
    let is_csv = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    let table = if is_csv { read_csv(bytes)? } else { read_workbook(bytes)? };
    debug!(
        columns = table.columns.len(),
        rows = table.len(),
        csv = is_csv,
        "Parsed upload"
    );
    Ok(table)
}

pub fn read_workbook(bytes: &[u8]) -> Result<Table, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoWorksheet)??;
    // The range starts at the first used cell, not necessarily A1.
    let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut rows = range.rows();
    let header = rows.next().ok_or(SpreadsheetError::Empty)?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, cell_value(cell)))
        .collect();

    let mut table = Table::new(columns);
    for (offset, row) in rows.enumerate() {
        table.push_row_at(header_row + 1 + offset, row.iter().map(cell_value).collect());
    }
    Ok(table)
}

pub fn read_csv(bytes: &[u8]) -> Result<Table, SpreadsheetError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    let delimiter = sniff_delimiter(bytes);
    let decimal_comma = delimiter == b';';
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, CellValue::Text(h.to_string())))
        .collect();
    if columns.is_empty() {
        return Err(SpreadsheetError::Empty);
    }

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        let cells = record.iter().map(|f| csv_cell(f, decimal_comma)).collect();
        match record.position() {
            Some(pos) => table.push_row_at(pos.line() as usize, cells),
            None => table.push_row(cells),
        }
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::from_number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

/// `decimal_comma` is set for `;`-delimited files, where `4,5` means 4.5.
fn csv_cell(field: &str, decimal_comma: bool) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(i) = field.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        return CellValue::Float(f);
    }
    if decimal_comma && field.matches(',').count() == 1 && !field.contains('.') {
        if let Ok(f) = field.trim().replace(',', ".").parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    CellValue::Text(field.to_string())
}

/// Blank headers get a placeholder so they never match a schema column.
fn header_name(index: usize, cell: CellValue) -> String {
    if cell.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        cell.to_string()
    }
}

/// Locale-exported CSV uses `;` when `,` is the decimal separator.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|&&b| b == b';').count();
    let commas = first_line.iter().filter(|&&b| b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}
