//! FILENAME: core/summary-engine/src/error.rs

use dataset::DatasetError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// The table lacks a required column or a column has the wrong type.
    #[error("Invalid input table: {0}")]
    InputInvalid(#[from] DatasetError),
}
