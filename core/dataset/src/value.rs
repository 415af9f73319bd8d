//! FILENAME: core/dataset/src/value.rs
//! Column values and the canonical order attributes.
//!
//! Every cell of an order table is normalized into a hashable `Value` so it
//! can be interned by the column stores in `field.rs`.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// VALUE
// ============================================================================

/// A normalized, hashable representation of a single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// A missing value (null / empty CSV field).
    Empty,
    Text(String),
    Number(OrderedFloat),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.0),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Calendar day of a timestamp value; finer time components are discarded.
    pub fn day(&self) -> Option<NaiveDate> {
        self.as_timestamp().map(|ts| ts.date())
    }

    /// Builds a text value, mapping the empty string to `Value::Empty`.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n.0),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(OrderedFloat(value))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Empty, Into::into)
    }
}

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as map keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // -0.0 == 0.0, so both must hash alike
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// The order attributes the summary engine reads, with their column names in
/// the cleaned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    OrderId,
    CustomerId,
    OrderStatus,
    PurchaseTimestamp,
    PaymentValue,
    ProductCategory,
    CustomerCity,
    CustomerState,
}

impl Attribute {
    /// All attributes in canonical column order.
    pub const ALL: [Attribute; 8] = [
        Attribute::OrderId,
        Attribute::CustomerId,
        Attribute::OrderStatus,
        Attribute::PurchaseTimestamp,
        Attribute::PaymentValue,
        Attribute::ProductCategory,
        Attribute::CustomerCity,
        Attribute::CustomerState,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::OrderId => "order_id",
            Attribute::CustomerId => "customer_id",
            Attribute::OrderStatus => "order_status",
            Attribute::PurchaseTimestamp => "order_purchase_timestamp",
            Attribute::PaymentValue => "payment_value",
            Attribute::ProductCategory => "product_category_name_english",
            Attribute::CustomerCity => "customer_city",
            Attribute::CustomerState => "customer_state",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
