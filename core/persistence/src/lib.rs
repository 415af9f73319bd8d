//! FILENAME: core/persistence/src/lib.rs
//! Order data loading.
//!
//! Reads the cleaned e-commerce dataset from CSV into a `dataset::OrderTable`
//! sorted by purchase timestamp.

mod csv_reader;
mod error;

pub use csv_reader::{load_orders_csv, parse_timestamp, read_orders_csv, CsvOptions};
pub use error::PersistenceError;
