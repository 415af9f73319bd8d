//! FILENAME: core/summary-engine/src/definition.rs
//! Summary Definitions - what each derived table IS.
//!
//! These structures describe an aggregation without performing it. They are:
//! - Serializable (so a dashboard can keep them in its configuration)
//! - Immutable snapshots of caller intent, passed by reference

use serde::{Deserialize, Serialize};

use dataset::{Attribute, DateRange};

// ============================================================================
// MISSING KEYS
// ============================================================================

/// What to do with rows whose grouping attribute is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Leave such rows out of the grouped table.
    Exclude,
    /// Group such rows under an explicit label. If a real group already
    /// carries the label, the two are merged.
    Bucket(String),
}

impl Default for MissingKeyPolicy {
    fn default() -> Self {
        MissingKeyPolicy::Exclude
    }
}

// ============================================================================
// ORDERING
// ============================================================================

/// Row order of a grouped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Groups in the order their key first appears in the input.
    FirstSeen,
    /// Ascending by key.
    KeyAscending,
    /// Descending by count; equal counts ascending by key.
    CountDescending,
}

impl Default for GroupOrder {
    fn default() -> Self {
        GroupOrder::KeyAscending
    }
}

// ============================================================================
// DISTINCT COUNT
// ============================================================================

/// A group-by / distinct-count reduction: partition rows by `group_by` and
/// count the unique values of `distinct_on` in each partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistinctCount {
    pub group_by: Attribute,
    pub distinct_on: Attribute,
    #[serde(default)]
    pub missing_key: MissingKeyPolicy,
    #[serde(default)]
    pub order: GroupOrder,
}

impl DistinctCount {
    pub fn new(group_by: Attribute, distinct_on: Attribute) -> Self {
        DistinctCount {
            group_by,
            distinct_on,
            missing_key: MissingKeyPolicy::Exclude,
            order: GroupOrder::KeyAscending,
        }
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    /// Orders per product category, most ordered first.
    pub fn category_orders() -> Self {
        Self::new(Attribute::ProductCategory, Attribute::OrderId)
            .with_order(GroupOrder::CountDescending)
    }

    pub fn customers_by_city() -> Self {
        Self::new(Attribute::CustomerCity, Attribute::CustomerId)
    }

    pub fn customers_by_state() -> Self {
        Self::new(Attribute::CustomerState, Attribute::CustomerId)
    }

    pub fn orders_by_city() -> Self {
        Self::new(Attribute::CustomerCity, Attribute::OrderId)
    }

    pub fn orders_by_state() -> Self {
        Self::new(Attribute::CustomerState, Attribute::OrderId)
    }
}

// ============================================================================
// SUMMARY REQUEST
// ============================================================================

/// Everything `compute_summaries_with` needs besides the table itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Inclusive purchase-day bounds.
    pub range: DateRange,

    /// Missing-key policy applied to all five grouped tables.
    #[serde(default)]
    pub missing_key: MissingKeyPolicy,
}

impl SummaryRequest {
    pub fn new(range: DateRange) -> Self {
        SummaryRequest {
            range,
            missing_key: MissingKeyPolicy::Exclude,
        }
    }

    pub fn with_missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }
}
