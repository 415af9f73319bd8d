//! FILENAME: core/dataset/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' is not temporal: found {value:?}")]
    NotTemporal { column: String, value: String },

    #[error("Column '{column}' is not numeric: found {value:?}")]
    NotNumeric { column: String, value: String },

    #[error("Row {row} has {found} values but the table has {expected} columns")]
    RowWidth { row: u32, expected: usize, found: usize },
}
