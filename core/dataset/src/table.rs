//! FILENAME: core/dataset/src/table.rs
//! Order Table - the row store every aggregation reads.
//!
//! Architecture:
//! - Each column keeps an interned dictionary (`FieldCache`)
//! - Rows are vectors of `ValueId`s into those dictionaries
//! - Dictionaries sit behind an `Arc`, so slicing a table by date copies
//!   only the id vectors of the rows that survive
//!
//! Tables are immutable once built; every transformation returns a new table.

use std::borrow::Borrow;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use smallvec::SmallVec;

use crate::error::DatasetError;
use crate::field::{FieldCache, FieldIndex, ValueId, EMPTY_VALUE, VALUE_ID_EMPTY};
use crate::range::DateRange;
use crate::record::OrderRecord;
use crate::value::{Attribute, Value};

/// Interned values of one row. Sixteen inline slots cover the cleaned
/// dataset's columns without a heap allocation per row.
pub type RecordValues = SmallVec<[ValueId; 16]>;

// ============================================================================
// RECORD
// ============================================================================

/// A single row, stored as interned value IDs indexed by `FieldIndex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position of the row in the source data (0-based, excluding header).
    pub source_row: u32,

    pub values: RecordValues,
}

impl Record {
    pub fn value_id(&self, field: FieldIndex) -> ValueId {
        self.values.get(field).copied().unwrap_or(VALUE_ID_EMPTY)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Accumulates rows for a new `OrderTable`.
#[derive(Debug, Clone)]
pub struct OrderTableBuilder {
    fields: Vec<FieldCache>,
    records: Vec<Record>,
}

impl OrderTableBuilder {
    /// Creates a builder with the given column names.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OrderTableBuilder {
            fields: header.into_iter().map(FieldCache::new).collect(),
            records: Vec::new(),
        }
    }

    /// Creates a builder with exactly the canonical order columns.
    pub fn for_orders() -> Self {
        Self::new(Attribute::ALL.iter().map(|a| a.column_name()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a row of values in column order. Short rows are padded with
    /// empty values; rows wider than the header are rejected.
    pub fn push_row<I>(&mut self, values: I) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = Value>,
    {
        let values: Vec<Value> = values.into_iter().collect();
        if values.len() > self.fields.len() {
            return Err(DatasetError::RowWidth {
                row: self.records.len() as u32,
                expected: self.fields.len(),
                found: values.len(),
            });
        }
        self.push_values(values);
        Ok(())
    }

    /// Appends a typed record, placing each attribute under its column.
    pub fn push_order(&mut self, record: &OrderRecord) -> Result<(), DatasetError> {
        let mut values = vec![Value::Empty; self.fields.len()];
        for attribute in Attribute::ALL {
            let index = self
                .fields
                .iter()
                .position(|f| f.name == attribute.column_name())
                .ok_or_else(|| DatasetError::MissingColumn(attribute.column_name().to_string()))?;
            values[index] = record.value(attribute);
        }
        self.push_values(values);
        Ok(())
    }

    fn push_values(&mut self, values: Vec<Value>) {
        let mut interned = RecordValues::with_capacity(self.fields.len());
        for (field, value) in self.fields.iter_mut().zip(values) {
            interned.push(field.intern(value));
        }
        // Pad with empty if needed
        interned.resize(self.fields.len(), VALUE_ID_EMPTY);

        self.records.push(Record {
            source_row: self.records.len() as u32,
            values: interned,
        });
    }

    pub fn finish(self) -> OrderTable {
        OrderTable {
            fields: Arc::from(self.fields),
            records: self.records,
        }
    }
}

// ============================================================================
// ORDER TABLE
// ============================================================================

/// An ordered sequence of order line items.
#[derive(Debug, Clone)]
pub struct OrderTable {
    fields: Arc<[FieldCache]>,
    records: Vec<Record>,
}

impl OrderTable {
    /// Builds a table with the canonical columns from typed records.
    pub fn from_orders<I>(orders: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<OrderRecord>,
    {
        let mut builder = OrderTableBuilder::for_orders();
        for order in orders {
            let order = order.borrow();
            builder.push_values(Attribute::ALL.iter().map(|&a| order.value(a)).collect());
        }
        builder.finish()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Column names in order.
    pub fn header(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, index: FieldIndex) -> Option<&FieldCache> {
        self.fields.get(index)
    }

    /// Finds a column by name.
    pub fn column(&self, name: &str) -> Option<FieldIndex> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Resolves an attribute's column, failing if the table lacks it.
    pub fn require(&self, attribute: Attribute) -> Result<FieldIndex, DatasetError> {
        self.column(attribute.column_name())
            .ok_or_else(|| DatasetError::MissingColumn(attribute.column_name().to_string()))
    }

    /// Resolves an attribute's column and checks every value in it is a timestamp.
    pub fn require_temporal(&self, attribute: Attribute) -> Result<FieldIndex, DatasetError> {
        let index = self.require(attribute)?;
        let field = &self.fields[index];
        if let Some((_, value)) = field.values().find(|(_, v)| v.as_timestamp().is_none()) {
            return Err(DatasetError::NotTemporal {
                column: field.name.clone(),
                value: value.to_string(),
            });
        }
        Ok(index)
    }

    /// Resolves an attribute's column and checks every value in it is a number.
    pub fn require_numeric(&self, attribute: Attribute) -> Result<FieldIndex, DatasetError> {
        let index = self.require(attribute)?;
        let field = &self.fields[index];
        if let Some((_, value)) = field.values().find(|(_, v)| v.as_number().is_none()) {
            return Err(DatasetError::NotNumeric {
                column: field.name.clone(),
                value: value.to_string(),
            });
        }
        Ok(index)
    }

    pub fn value(&self, record: &Record, field: FieldIndex) -> &Value {
        self.fields
            .get(field)
            .and_then(|f| f.get_value(record.value_id(field)))
            .unwrap_or(&EMPTY_VALUE)
    }

    pub fn day(&self, record: &Record, field: FieldIndex) -> Option<NaiveDate> {
        self.value(record, field).day()
    }

    pub fn number(&self, record: &Record, field: FieldIndex) -> Option<f64> {
        self.value(record, field).as_number()
    }

    /// Number of distinct non-empty values of an attribute across the rows.
    pub fn distinct_count(&self, attribute: Attribute) -> Result<usize, DatasetError> {
        let field = self.require(attribute)?;
        let mut ids: Vec<ValueId> = self
            .records
            .iter()
            .map(|r| r.value_id(field))
            .filter(|&id| id != VALUE_ID_EMPTY)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.len())
    }

    /// Stable ascending sort by purchase timestamp; rows without one go last.
    pub fn sort_by_timestamp(self) -> Result<OrderTable, DatasetError> {
        let ts = self.require_temporal(Attribute::PurchaseTimestamp)?;
        let OrderTable { fields, mut records } = self;

        records.sort_by_key(|record| {
            let at = fields[ts]
                .get_value(record.value_id(ts))
                .and_then(Value::as_timestamp);
            (at.is_none(), at)
        });

        debug!("sorted {} records by {}", records.len(), fields[ts].name);
        Ok(OrderTable { fields, records })
    }

    /// Earliest and latest purchase day, or `None` when no row has a timestamp.
    pub fn timestamp_span(&self) -> Result<Option<DateRange>, DatasetError> {
        let ts = self.require_temporal(Attribute::PurchaseTimestamp)?;
        let mut span: Option<DateRange> = None;

        for record in &self.records {
            if let Some(day) = self.day(record, ts) {
                span = Some(match span {
                    None => DateRange::single_day(day),
                    Some(r) => DateRange::new(r.start.min(day), r.end.max(day)),
                });
            }
        }

        Ok(span)
    }

    /// Rows whose purchase day lies inside `range`, in their original order.
    pub fn slice(&self, range: &DateRange) -> Result<OrderTable, DatasetError> {
        let ts = self.require_temporal(Attribute::PurchaseTimestamp)?;
        let sliced = self.select(|record| self.day(record, ts).is_some_and(|d| range.contains(d)));
        debug!("sliced {} of {} records to {}", sliced.len(), self.len(), range);
        Ok(sliced)
    }

    /// Rows with the given order status, in their original order.
    pub fn filter_status(&self, status: &str) -> Result<OrderTable, DatasetError> {
        let field = self.require(Attribute::OrderStatus)?;
        let filtered = match self.fields[field].find(&Value::text(status)) {
            Some(id) => self.select(|record| record.value_id(field) == id),
            None => self.select(|_| false),
        };
        Ok(filtered)
    }

    fn select(&self, mut keep: impl FnMut(&Record) -> bool) -> OrderTable {
        OrderTable {
            fields: Arc::clone(&self.fields),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
