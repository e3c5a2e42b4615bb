use thiserror::Error;

#[derive(Debug, Error)]
pub enum HemoscanError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Invalid value {value:?} in column '{column}' at row {row}: expected a number")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("file contains no data rows")]
    NoDataRows,

    #[error("Result count mismatch: {identifiers} identifiers but {labels} predictions")]
    LengthMismatch { identifiers: usize, labels: usize },
}

pub type Result<T> = std::result::Result<T, HemoscanError>;
