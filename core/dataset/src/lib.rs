//! FILENAME: core/dataset/src/lib.rs
//! Order table data model.
//!
//! This crate holds the shared types every other crate speaks: column values,
//! interned column stores, the order table itself and the date ranges used to
//! slice it. It knows nothing about aggregation or presentation.

pub mod error;
pub mod field;
pub mod range;
pub mod record;
pub mod table;
pub mod value;

pub use error::DatasetError;
pub use field::{FieldCache, FieldIndex, ValueId, VALUE_ID_EMPTY};
pub use range::DateRange;
pub use record::OrderRecord;
pub use table::{OrderTable, OrderTableBuilder, Record, RecordValues};
pub use value::{Attribute, OrderedFloat, Value};
