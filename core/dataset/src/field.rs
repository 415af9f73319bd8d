//! FILENAME: core/dataset/src/field.rs
//! Per-column value interning.
//!
//! Each unique value of a column is stored once and referenced by a `ValueId`.
//! Distinct counts then reduce to counting unique ids, and slicing a table
//! only copies id vectors while the dictionaries stay shared.

use rustc_hash::FxHashMap;

use crate::value::Value;

/// A reference to an interned value within a column's unique value store.
/// u32 supports up to 4B unique values per column.
pub type ValueId = u32;

/// Index of a column in an order table (0-based).
pub type FieldIndex = usize;

/// Represents a missing value.
pub const VALUE_ID_EMPTY: ValueId = u32::MAX;

pub(crate) static EMPTY_VALUE: Value = Value::Empty;

/// Unique value store for a single column.
#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    /// Column name from the header row.
    pub name: String,

    /// Map from value to its unique ID (for deduplication during build).
    value_to_id: FxHashMap<Value, ValueId>,

    /// Unique values indexed by ValueId.
    id_to_value: Vec<Value>,
}

impl FieldCache {
    pub fn new(name: impl Into<String>) -> Self {
        FieldCache {
            name: name.into(),
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
        }
    }

    /// Interns a value and returns its ValueId.
    /// If the value already exists, returns the existing ID.
    pub fn intern(&mut self, value: Value) -> ValueId {
        if value.is_empty() {
            return VALUE_ID_EMPTY;
        }

        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value, id);
        id
    }

    /// Gets the value for a given ID. `VALUE_ID_EMPTY` resolves to `Value::Empty`.
    pub fn get_value(&self, id: ValueId) -> Option<&Value> {
        if id == VALUE_ID_EMPTY {
            return Some(&EMPTY_VALUE);
        }
        self.id_to_value.get(id as usize)
    }

    /// Looks up the id of an already interned value.
    pub fn find(&self, value: &Value) -> Option<ValueId> {
        if value.is_empty() {
            return Some(VALUE_ID_EMPTY);
        }
        self.value_to_id.get(value).copied()
    }

    /// Returns the number of unique values (excluding empty).
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// Iterates over the unique non-empty values in interning order.
    pub fn values(&self) -> impl Iterator<Item = (ValueId, &Value)> {
        self.id_to_value
            .iter()
            .enumerate()
            .map(|(id, value)| (id as ValueId, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_deduplicates() {
        let mut field = FieldCache::new("customer_city");
        let rio = field.intern(Value::from("Rio"));
        let sp = field.intern(Value::from("Sao Paulo"));
        assert_eq!(field.intern(Value::from("Rio")), rio);
        assert_ne!(rio, sp);
        assert_eq!(field.unique_count(), 2);
        assert_eq!(field.get_value(sp), Some(&Value::from("Sao Paulo")));
    }

    #[test]
    fn test_empty_values_are_not_stored() {
        let mut field = FieldCache::new("customer_city");
        assert_eq!(field.intern(Value::Empty), VALUE_ID_EMPTY);
        assert_eq!(field.unique_count(), 0);
        assert_eq!(field.get_value(VALUE_ID_EMPTY), Some(&Value::Empty));
        assert_eq!(field.find(&Value::from("Rio")), None);
    }
}
