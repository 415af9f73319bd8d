//! FILENAME: core/summary-engine/src/view.rs
//! Summary View - the derived tables handed to presentation.
//!
//! Everything here is plain data with serde support. The ranking helpers
//! (`top_n`, `bottom_n`) and the headline metrics are read-only views over a
//! computed bundle; they never re-scan the order table.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dataset::DateRange;

// ============================================================================
// ROWS
// ============================================================================

/// One row of a grouped table: a key and the distinct count for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        GroupCount {
            key: key.into(),
            count,
        }
    }
}

/// One calendar day of the daily orders table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub order_count: u64,
    pub revenue: f64,
}

impl DailyOrders {
    /// A zero-filled bucket.
    pub fn empty(date: NaiveDate) -> Self {
        DailyOrders {
            date,
            order_count: 0,
            revenue: 0.0,
        }
    }
}

/// Summary metrics shown above the daily chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub total_orders: u64,
    pub total_revenue: f64,
}

// ============================================================================
// BUNDLE
// ============================================================================

/// The six derived tables for one date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBundle {
    pub range: DateRange,
    pub daily_orders: Vec<DailyOrders>,
    /// Sorted descending by order count, ties ascending by category.
    pub category_orders: Vec<GroupCount>,
    pub customers_by_city: Vec<GroupCount>,
    pub customers_by_state: Vec<GroupCount>,
    pub orders_by_city: Vec<GroupCount>,
    pub orders_by_state: Vec<GroupCount>,
}

impl SummaryBundle {
    /// Totals over the daily table.
    pub fn headline(&self) -> Headline {
        Headline {
            total_orders: self.daily_orders.iter().map(|d| d.order_count).sum(),
            total_revenue: self.daily_orders.iter().map(|d| d.revenue).sum(),
        }
    }

    /// Most ordered categories.
    pub fn best_categories(&self, n: usize) -> Vec<GroupCount> {
        top_n(&self.category_orders, n)
    }

    /// Least ordered categories, fewest first.
    pub fn worst_categories(&self, n: usize) -> Vec<GroupCount> {
        bottom_n(&self.category_orders, n)
    }

    pub fn top_cities_by_customers(&self, n: usize) -> Vec<GroupCount> {
        top_n(&self.customers_by_city, n)
    }

    pub fn top_states_by_customers(&self, n: usize) -> Vec<GroupCount> {
        top_n(&self.customers_by_state, n)
    }

    pub fn top_cities_by_orders(&self, n: usize) -> Vec<GroupCount> {
        top_n(&self.orders_by_city, n)
    }

    pub fn top_states_by_orders(&self, n: usize) -> Vec<GroupCount> {
        top_n(&self.orders_by_state, n)
    }
}

// ============================================================================
// RANKING
// ============================================================================

/// Descending by count, ties ascending by key.
pub fn compare_count_descending(a: &GroupCount, b: &GroupCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

/// Ascending by count, ties ascending by key.
pub fn compare_count_ascending(a: &GroupCount, b: &GroupCount) -> Ordering {
    a.count.cmp(&b.count).then_with(|| a.key.cmp(&b.key))
}

/// The `n` rows with the highest counts.
pub fn top_n(rows: &[GroupCount], n: usize) -> Vec<GroupCount> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(compare_count_descending);
    sorted.truncate(n);
    sorted
}

/// The `n` rows with the lowest counts, lowest first.
pub fn bottom_n(rows: &[GroupCount], n: usize) -> Vec<GroupCount> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(compare_count_ascending);
    sorted.truncate(n);
    sorted
}
