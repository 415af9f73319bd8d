//! FILENAME: core/persistence/src/error.rs

use dataset::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV input was empty")]
    EmptyInput,

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("Parse error at row {row}, column {column}: {reason}")]
    Parse { row: u64, column: u64, reason: String },

    #[error("Invalid table: {0}")]
    Dataset(#[from] DatasetError),
}
