//! FILENAME: core/summary-engine/src/lib.rs
//! Order summary subsystem.
//!
//! Turns an order table into the six derived tables a sales dashboard shows:
//! daily orders and revenue, orders per product category, and customers and
//! orders per customer city and state. It depends on `dataset` for the table
//! and on nothing presentation related.
//!
//! Layers:
//! - `definition`: Serializable configuration (what a summary IS)
//! - `cache`: Per-group accumulators (HOW we count)
//! - `view`: Derived tables and ranking windows (WHAT we hand to presentation)
//! - `engine`: Aggregation functions (HOW we calculate)

pub mod cache;
pub mod definition;
pub mod engine;
pub mod error;
pub mod view;

pub use definition::*;
pub use engine::{
    category_orders, compute_summaries, compute_summaries_with, customers_by_city,
    customers_by_state, daily_orders, daily_orders_between, distinct_count_by, orders_by_city,
    orders_by_state, REQUIRED_ATTRIBUTES,
};
pub use error::SummaryError;
pub use view::*;
