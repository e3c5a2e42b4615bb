//! Loosely typed in-memory table produced by the upload parser.

use serde::{Serialize, Serializer};
use std::fmt;

/// A single spreadsheet cell as read, before any schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Spreadsheets store every number as a float; whole values become `Int`.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            CellValue::Int(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view used for model features. Empty cells are missing values (NaN).
    /// Returns `None` for text that is not a plain number; `"1,234"` is rejected
    /// rather than guessed at.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Empty => Some(f64::NAN),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(f64::NAN);
                }
                trimmed.parse::<f64>().ok()
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            CellValue::Float(_) => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

/// Header row plus data rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based row number in the uploaded file, parallel to `rows`.
    source_rows: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new(), source_rows: Vec::new() }
    }

    /// Append a row directly below the previous kept row (header is row 1).
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        let next = self.source_rows.last().map_or(2, |r| r + 1);
        self.push_row_at(next, row);
    }

    /// Append a row read from line `source_row` of the upload, padding or
    /// truncating it to the header width. Rows with no content are dropped.
    pub fn push_row_at(&mut self, source_row: usize, mut row: Vec<CellValue>) {
        if row.iter().all(CellValue::is_empty) {
            return;
        }
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
        self.source_rows.push(source_row);
    }

    /// Row number in the uploaded file for data row `index`.
    pub fn source_row(&self, index: usize) -> usize {
        self.source_rows.get(index).copied().unwrap_or(index + 2)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column whose header equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<CellValue>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Empty))
                .collect(),
        )
    }
}
