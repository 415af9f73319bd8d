//! FILENAME: core/summary-engine/src/engine.rs
//! Summary Engine - turns an order table into the derived summary tables.
//!
//! Grouped tables:
//! 1. Resolve the group-by and distinct-on columns
//! 2. One pass over the rows, partitioning by interned group key and
//!    collecting the interned identifiers of each partition
//! 3. Apply the missing-key policy to the partition of empty keys
//! 4. Resolve keys to labels and order the rows
//!
//! Daily table: rows are bucketed by purchase day, then resampled over a
//! continuous span so days without rows still appear, zero-filled.
//!
//! Every function here is pure: it reads an immutable table and returns a
//! freshly built result.

use log::{debug, info};

use dataset::{Attribute, DateRange, OrderTable, Value, VALUE_ID_EMPTY};

use crate::cache::{DailyCache, GroupCache};
use crate::definition::{DistinctCount, GroupOrder, MissingKeyPolicy, SummaryRequest};
use crate::error::SummaryError;
use crate::view::{compare_count_descending, DailyOrders, GroupCount, SummaryBundle};

/// Columns `compute_summaries` reads.
pub const REQUIRED_ATTRIBUTES: [Attribute; 7] = [
    Attribute::OrderId,
    Attribute::CustomerId,
    Attribute::PurchaseTimestamp,
    Attribute::PaymentValue,
    Attribute::ProductCategory,
    Attribute::CustomerCity,
    Attribute::CustomerState,
];

// ============================================================================
// GROUPED TABLES
// ============================================================================

/// Partitions rows by `definition.group_by` and counts the distinct values of
/// `definition.distinct_on` in each partition.
///
/// Rows with an empty identifier still form their group but add nothing to
/// its count, so a group can report zero.
pub fn distinct_count_by(
    table: &OrderTable,
    definition: &DistinctCount,
) -> Result<Vec<GroupCount>, SummaryError> {
    let group_field = table.require(definition.group_by)?;
    let distinct_field = table.require(definition.distinct_on)?;
    let mut cache = GroupCache::build(table, group_field, distinct_field);

    let mut unlabelled_bucket = None;
    if let Some(missing) = cache.take_empty() {
        match &definition.missing_key {
            MissingKeyPolicy::Exclude => {
                debug!(
                    "excluded {} rows with empty {}",
                    missing.rows, definition.group_by
                );
            }
            MissingKeyPolicy::Bucket(label) => {
                let existing = table
                    .field(group_field)
                    .and_then(|f| f.find(&Value::text(label.as_str())))
                    .filter(|&id| id != VALUE_ID_EMPTY);
                match existing {
                    Some(id) => cache.merge_into(id, &missing),
                    None => unlabelled_bucket = Some(GroupCount::new(label.as_str(), missing.count())),
                }
            }
        }
    }

    let field = table.field(group_field);
    let mut rows: Vec<GroupCount> = cache
        .groups()
        .map(|(key, acc)| {
            let label = field
                .and_then(|f| f.get_value(key))
                .map(ToString::to_string)
                .unwrap_or_default();
            GroupCount::new(label, acc.count())
        })
        .collect();
    rows.extend(unlabelled_bucket);

    match definition.order {
        GroupOrder::FirstSeen => {}
        GroupOrder::KeyAscending => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        GroupOrder::CountDescending => rows.sort_by(compare_count_descending),
    }

    debug!(
        "grouped {} rows by {} into {} groups (distinct {})",
        table.len(),
        definition.group_by,
        rows.len(),
        definition.distinct_on
    );
    Ok(rows)
}

/// Distinct orders per product category, most ordered first; equal counts are
/// ordered by category name. An order touching several categories counts once
/// in each of them.
pub fn category_orders(table: &OrderTable) -> Result<Vec<GroupCount>, SummaryError> {
    distinct_count_by(table, &DistinctCount::category_orders())
}

/// Distinct customers per city.
pub fn customers_by_city(table: &OrderTable) -> Result<Vec<GroupCount>, SummaryError> {
    distinct_count_by(table, &DistinctCount::customers_by_city())
}

/// Distinct customers per state.
pub fn customers_by_state(table: &OrderTable) -> Result<Vec<GroupCount>, SummaryError> {
    distinct_count_by(table, &DistinctCount::customers_by_state())
}

/// Distinct orders per customer city. An order whose rows disagree on the
/// city is counted under each city it appears with.
pub fn orders_by_city(table: &OrderTable) -> Result<Vec<GroupCount>, SummaryError> {
    distinct_count_by(table, &DistinctCount::orders_by_city())
}

/// Distinct orders per customer state.
pub fn orders_by_state(table: &OrderTable) -> Result<Vec<GroupCount>, SummaryError> {
    distinct_count_by(table, &DistinctCount::orders_by_state())
}

// ============================================================================
// DAILY TABLE
// ============================================================================

/// Distinct orders and revenue for every day from the first to the last
/// purchase day in `table`, zero-filling days without rows. Revenue sums every
/// row, so a multi-item order contributes once per item.
pub fn daily_orders(table: &OrderTable) -> Result<Vec<DailyOrders>, SummaryError> {
    let cache = build_daily_cache(table)?;
    Ok(match cache.span() {
        Some(span) => resample(&cache, &span),
        None => Vec::new(),
    })
}

/// Like `daily_orders`, but over exactly the days of `range`. Rows outside
/// the range are ignored; an empty range yields an empty table.
pub fn daily_orders_between(
    table: &OrderTable,
    range: &DateRange,
) -> Result<Vec<DailyOrders>, SummaryError> {
    let cache = build_daily_cache(table)?;
    Ok(resample(&cache, range))
}

fn build_daily_cache(table: &OrderTable) -> Result<DailyCache, SummaryError> {
    let timestamp_field = table.require_temporal(Attribute::PurchaseTimestamp)?;
    let order_field = table.require(Attribute::OrderId)?;
    let payment_field = table.require_numeric(Attribute::PaymentValue)?;
    Ok(DailyCache::build(table, timestamp_field, order_field, payment_field))
}

fn resample(cache: &DailyCache, range: &DateRange) -> Vec<DailyOrders> {
    range
        .days()
        .map(|date| match cache.get(date) {
            Some(day) => DailyOrders {
                date,
                order_count: day.orders.count(),
                revenue: day.revenue,
            },
            None => DailyOrders::empty(date),
        })
        .collect()
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Slices `table` to `range` and derives all six summary tables from the slice.
pub fn compute_summaries(
    table: &OrderTable,
    range: &DateRange,
) -> Result<SummaryBundle, SummaryError> {
    compute_summaries_with(table, &SummaryRequest::new(*range))
}

/// `compute_summaries` with an explicit missing-key policy.
pub fn compute_summaries_with(
    table: &OrderTable,
    request: &SummaryRequest,
) -> Result<SummaryBundle, SummaryError> {
    for attribute in REQUIRED_ATTRIBUTES {
        table.require(attribute)?;
    }

    let sliced = table.slice(&request.range)?;
    let grouped = |definition: DistinctCount| {
        distinct_count_by(
            &sliced,
            &definition.with_missing_key(request.missing_key.clone()),
        )
    };

    let bundle = SummaryBundle {
        range: request.range,
        daily_orders: daily_orders_between(&sliced, &request.range)?,
        category_orders: grouped(DistinctCount::category_orders())?,
        customers_by_city: grouped(DistinctCount::customers_by_city())?,
        customers_by_state: grouped(DistinctCount::customers_by_state())?,
        orders_by_city: grouped(DistinctCount::orders_by_city())?,
        orders_by_state: grouped(DistinctCount::orders_by_state())?,
    };

    info!(
        "summarised {} of {} rows for {}: {} days, {} categories, {} cities, {} states",
        sliced.len(),
        table.len(),
        request.range,
        bundle.daily_orders.len(),
        bundle.category_orders.len(),
        bundle.customers_by_city.len(),
        bundle.customers_by_state.len()
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dataset::{DatasetError, OrderRecord, OrderTableBuilder};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn line(order: &str, customer: &str, when: NaiveDateTime, pay: f64) -> OrderRecord {
        OrderRecord::new(order, customer, when).with_payment(pay)
    }

    fn create_test_table() -> OrderTable {
        OrderTable::from_orders([
            line("o1", "c1", at(2018, 1, 1, 9), 10.0)
                .with_category("toys")
                .with_location("rio de janeiro", "RJ"),
            line("o1", "c1", at(2018, 1, 1, 9), 20.0)
                .with_category("books")
                .with_location("rio de janeiro", "RJ"),
            line("o2", "c2", at(2018, 1, 3, 14), 7.5)
                .with_category("toys")
                .with_location("sao paulo", "SP"),
            line("o3", "c1", at(2018, 1, 3, 20), 3.0)
                .with_category("garden")
                .with_location("rio de janeiro", "RJ"),
            line("o4", "c3", at(2018, 1, 4, 1), 12.0)
                .with_category("books")
                .with_location("campinas", "SP"),
        ])
    }

    #[test]
    fn test_single_order_two_items() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 10.0)
                .with_category("toys")
                .with_location("Rio", "RJ"),
            line("A", "1", at(2018, 1, 1, 10), 5.0)
                .with_category("toys")
                .with_location("Rio", "RJ"),
        ]);

        let daily = daily_orders(&table).unwrap();
        assert_eq!(
            daily,
            vec![DailyOrders { date: day(2018, 1, 1), order_count: 1, revenue: 15.0 }]
        );
        assert_eq!(category_orders(&table).unwrap(), vec![GroupCount::new("toys", 1)]);
        assert_eq!(customers_by_city(&table).unwrap(), vec![GroupCount::new("Rio", 1)]);
    }

    #[test]
    fn test_two_customers_two_states_two_days() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 10.0).with_location("Rio", "RJ"),
            line("B", "2", at(2018, 1, 2, 10), 5.0).with_location("Sao Paulo", "SP"),
        ]);

        let daily = daily_orders(&table).unwrap();
        assert_eq!(daily.len(), 2);
        assert!(daily.iter().all(|d| d.order_count == 1));
        assert_eq!(
            customers_by_state(&table).unwrap(),
            vec![GroupCount::new("RJ", 1), GroupCount::new("SP", 1)]
        );
    }

    #[test]
    fn test_daily_orders_zero_fills_gaps() {
        let daily = daily_orders(&create_test_table()).unwrap();
        let counts: Vec<(NaiveDate, u64)> = daily.iter().map(|d| (d.date, d.order_count)).collect();
        assert_eq!(
            counts,
            vec![
                (day(2018, 1, 1), 1),
                (day(2018, 1, 2), 0),
                (day(2018, 1, 3), 2),
                (day(2018, 1, 4), 1),
            ]
        );
        assert_eq!(daily[0].revenue, 30.0);
        assert_eq!(daily[1].revenue, 0.0);
        assert_eq!(daily[2].revenue, 10.5);
    }

    #[test]
    fn test_daily_orders_between_covers_whole_range() {
        let table = create_test_table();
        let range = DateRange::new(day(2017, 12, 31), day(2018, 1, 2));
        let daily = daily_orders_between(&table, &range).unwrap();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0], DailyOrders::empty(day(2017, 12, 31)));
        assert_eq!(daily[1].order_count, 1);
        assert_eq!(daily[2].order_count, 0);
    }

    #[test]
    fn test_daily_orders_empty_input() {
        let table = OrderTable::from_orders(Vec::<OrderRecord>::new());
        assert!(daily_orders(&table).unwrap().is_empty());
    }

    #[test]
    fn test_rows_without_timestamp_are_left_out_of_daily_table() {
        let mut undated = line("o9", "c9", at(2018, 1, 1, 0), 100.0);
        undated.purchased_at = None;
        let table = OrderTable::from_orders([line("o1", "c1", at(2018, 1, 1, 8), 1.0), undated]);

        let daily = daily_orders(&table).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].order_count, 1);
        assert_eq!(daily[0].revenue, 1.0);
    }

    #[test]
    fn test_category_orders_sorted_with_name_tie_break() {
        let rows = category_orders(&create_test_table()).unwrap();
        assert_eq!(
            rows,
            vec![
                GroupCount::new("books", 2),
                GroupCount::new("toys", 2),
                GroupCount::new("garden", 1),
            ]
        );
    }

    #[test]
    fn test_order_spanning_categories_counts_in_each() {
        let table = create_test_table();
        let total: u64 = category_orders(&table).unwrap().iter().map(|r| r.count).sum();
        let distinct = table.distinct_count(Attribute::OrderId).unwrap() as u64;
        assert_eq!(distinct, 4);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_location_tables() {
        let table = create_test_table();
        assert_eq!(
            customers_by_city(&table).unwrap(),
            vec![
                GroupCount::new("campinas", 1),
                GroupCount::new("rio de janeiro", 1),
                GroupCount::new("sao paulo", 1),
            ]
        );
        assert_eq!(
            orders_by_city(&table).unwrap(),
            vec![
                GroupCount::new("campinas", 1),
                GroupCount::new("rio de janeiro", 2),
                GroupCount::new("sao paulo", 1),
            ]
        );
        assert_eq!(
            customers_by_state(&table).unwrap(),
            vec![GroupCount::new("RJ", 1), GroupCount::new("SP", 2)]
        );
        assert_eq!(
            orders_by_state(&table).unwrap(),
            vec![GroupCount::new("RJ", 2), GroupCount::new("SP", 2)]
        );
    }

    #[test]
    fn test_conflicting_locations_are_not_deduplicated() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_location("Rio", "RJ"),
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_location("Niteroi", "RJ"),
        ]);
        let total: u64 = orders_by_city(&table).unwrap().iter().map(|r| r.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_missing_keys_excluded_by_default() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_category("toys"),
            line("B", "2", at(2018, 1, 1, 11), 1.0),
        ]);
        assert_eq!(category_orders(&table).unwrap(), vec![GroupCount::new("toys", 1)]);
    }

    #[test]
    fn test_missing_keys_bucketed_under_label() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_category("toys"),
            line("B", "2", at(2018, 1, 1, 11), 1.0),
            line("C", "3", at(2018, 1, 1, 12), 1.0),
        ]);
        let definition = DistinctCount::category_orders()
            .with_missing_key(MissingKeyPolicy::Bucket("unknown".to_string()));
        assert_eq!(
            distinct_count_by(&table, &definition).unwrap(),
            vec![GroupCount::new("unknown", 2), GroupCount::new("toys", 1)]
        );
    }

    #[test]
    fn test_bucket_merges_with_existing_label() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_category("unknown"),
            line("A", "1", at(2018, 1, 1, 10), 1.0),
            line("B", "2", at(2018, 1, 1, 11), 1.0),
        ]);
        let definition = DistinctCount::category_orders()
            .with_missing_key(MissingKeyPolicy::Bucket("unknown".to_string()));
        assert_eq!(
            distinct_count_by(&table, &definition).unwrap(),
            vec![GroupCount::new("unknown", 2)]
        );
    }

    #[test]
    fn test_first_seen_order() {
        let definition = DistinctCount::orders_by_city().with_order(GroupOrder::FirstSeen);
        let rows = distinct_count_by(&create_test_table(), &definition).unwrap();
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["rio de janeiro", "sao paulo", "campinas"]);
    }

    #[test]
    fn test_aggregators_are_idempotent() {
        let table = create_test_table();
        assert_eq!(daily_orders(&table).unwrap(), daily_orders(&table).unwrap());
        assert_eq!(category_orders(&table).unwrap(), category_orders(&table).unwrap());
        assert_eq!(orders_by_state(&table).unwrap(), orders_by_state(&table).unwrap());
    }

    #[test]
    fn test_compute_summaries_slices_by_range() {
        let table = create_test_table();
        let bundle = compute_summaries(&table, &DateRange::new(day(2018, 1, 3), day(2018, 1, 4))).unwrap();

        assert_eq!(bundle.daily_orders.len(), 2);
        assert_eq!(bundle.headline().total_orders, 3);
        assert_eq!(bundle.headline().total_revenue, 22.5);
        assert_eq!(bundle.category_orders.len(), 3);
        assert_eq!(bundle.orders_by_state, vec![GroupCount::new("RJ", 1), GroupCount::new("SP", 2)]);
        // the source table is untouched
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_compute_summaries_single_day() {
        let bundle = compute_summaries(&create_test_table(), &DateRange::single_day(day(2018, 1, 2))).unwrap();
        assert_eq!(bundle.daily_orders, vec![DailyOrders::empty(day(2018, 1, 2))]);
        assert!(bundle.category_orders.is_empty());
    }

    #[test]
    fn test_compute_summaries_empty_range_never_errors() {
        let range = DateRange::new(day(2018, 2, 1), day(2018, 1, 1));
        let bundle = compute_summaries(&create_test_table(), &range).unwrap();
        assert!(bundle.daily_orders.is_empty());
        assert!(bundle.category_orders.is_empty());
        assert!(bundle.customers_by_city.is_empty());
        assert!(bundle.customers_by_state.is_empty());
        assert!(bundle.orders_by_city.is_empty());
        assert!(bundle.orders_by_state.is_empty());
    }

    #[test]
    fn test_compute_summaries_with_bucket_policy() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 1.0).with_location("Rio", "RJ"),
            line("B", "2", at(2018, 1, 1, 11), 1.0),
        ]);
        let request = SummaryRequest::new(DateRange::single_day(day(2018, 1, 1)))
            .with_missing_key(MissingKeyPolicy::Bucket("unknown".to_string()));
        let bundle = compute_summaries_with(&table, &request).unwrap();
        assert_eq!(
            bundle.customers_by_city,
            vec![GroupCount::new("Rio", 1), GroupCount::new("unknown", 1)]
        );
        assert_eq!(bundle.category_orders, vec![GroupCount::new("unknown", 2)]);
    }

    #[test]
    fn test_missing_column_is_input_invalid() {
        let mut builder = OrderTableBuilder::new(["order_id", "order_purchase_timestamp"]);
        builder
            .push_row([Value::from("A"), Value::from(at(2018, 1, 1, 0))])
            .unwrap();
        let table = builder.finish();

        let err = compute_summaries(&table, &DateRange::single_day(day(2018, 1, 1))).unwrap_err();
        assert_eq!(
            err,
            SummaryError::InputInvalid(DatasetError::MissingColumn("customer_id".to_string()))
        );
        assert!(matches!(category_orders(&table), Err(SummaryError::InputInvalid(_))));
    }

    #[test]
    fn test_text_timestamps_are_input_invalid() {
        let header = Attribute::ALL.iter().map(|a| a.column_name());
        let mut builder = OrderTableBuilder::new(header);
        builder
            .push_row([
                Value::from("A"),
                Value::from("1"),
                Value::from("delivered"),
                Value::from("2018-01-01 10:00:00"),
                Value::from(10.0),
                Value::from("toys"),
                Value::from("Rio"),
                Value::from("RJ"),
            ])
            .unwrap();
        let table = builder.finish();

        assert!(matches!(
            daily_orders(&table),
            Err(SummaryError::InputInvalid(DatasetError::NotTemporal { .. }))
        ));
        assert!(compute_summaries(&table, &DateRange::single_day(day(2018, 1, 1))).is_err());
    }

    #[test]
    fn test_delivered_only_totals_compose_explicitly() {
        let table = OrderTable::from_orders([
            line("A", "1", at(2018, 1, 1, 10), 10.0),
            line("B", "2", at(2018, 1, 1, 11), 4.0).with_status("canceled"),
        ]);
        let all = daily_orders(&table).unwrap();
        let delivered = daily_orders(&table.filter_status("delivered").unwrap()).unwrap();
        assert_eq!(all[0].order_count, 2);
        assert_eq!(all[0].revenue, 14.0);
        assert_eq!(delivered[0].order_count, 1);
        assert_eq!(delivered[0].revenue, 10.0);
    }
}
