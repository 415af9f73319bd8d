//! FILENAME: core/summary-engine/src/cache.rs
//! Summary Cache - per-group accumulators built in one pass over a table.
//!
//! Group keys and identifiers are the interned `ValueId`s of the order table,
//! so a distinct count is the size of a set of `u32`s and no strings are
//! hashed while scanning rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use dataset::{DateRange, FieldIndex, OrderTable, ValueId, VALUE_ID_EMPTY};

// ============================================================================
// DISTINCT ACCUMULATOR
// ============================================================================

/// Collects the unique identifiers seen in one group.
#[derive(Debug, Clone, Default)]
pub struct DistinctAccumulator {
    ids: FxHashSet<ValueId>,
    /// Rows folded in, including rows with an empty identifier.
    pub rows: u64,
}

impl DistinctAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row's identifier. Empty identifiers are never counted.
    pub fn add(&mut self, id: ValueId) {
        self.rows += 1;
        if id != VALUE_ID_EMPTY {
            self.ids.insert(id);
        }
    }

    pub fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    pub fn merge(&mut self, other: &DistinctAccumulator) {
        self.rows += other.rows;
        self.ids.extend(other.ids.iter().copied());
    }
}

// ============================================================================
// GROUP CACHE
// ============================================================================

/// Stable partition of rows by one column, with a distinct accumulator per group.
/// Groups keep the order in which their key first appeared.
#[derive(Debug, Clone, Default)]
pub struct GroupCache {
    slots: FxHashMap<ValueId, usize>,
    groups: Vec<(ValueId, DistinctAccumulator)>,
}

impl GroupCache {
    /// Scans every row of `table`, grouping by `group_field` and collecting
    /// the distinct values of `distinct_field`.
    pub fn build(table: &OrderTable, group_field: FieldIndex, distinct_field: FieldIndex) -> Self {
        let mut cache = GroupCache::default();
        for record in table.records() {
            cache.add(record.value_id(group_field), record.value_id(distinct_field));
        }
        cache
    }

    pub fn add(&mut self, key: ValueId, id: ValueId) {
        let slot = match self.slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.slots.insert(key, slot);
                self.groups.push((key, DistinctAccumulator::new()));
                slot
            }
        };
        self.groups[slot].1.add(id);
    }

    /// Removes the group of rows with an empty key, if any.
    pub fn take_empty(&mut self) -> Option<DistinctAccumulator> {
        let slot = self.slots.remove(&VALUE_ID_EMPTY)?;
        let (_, accumulator) = self.groups.remove(slot);
        for index in self.slots.values_mut() {
            if *index > slot {
                *index -= 1;
            }
        }
        Some(accumulator)
    }

    /// Folds `accumulator` into the group for `key`, creating it if needed.
    pub fn merge_into(&mut self, key: ValueId, accumulator: &DistinctAccumulator) {
        match self.slots.get(&key) {
            Some(&slot) => self.groups[slot].1.merge(accumulator),
            None => {
                self.slots.insert(key, self.groups.len());
                self.groups.push((key, accumulator.clone()));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order.
    pub fn groups(&self) -> impl Iterator<Item = (ValueId, &DistinctAccumulator)> {
        self.groups.iter().map(|(key, acc)| (*key, acc))
    }
}

// ============================================================================
// DAILY CACHE
// ============================================================================

/// Orders and revenue collected for one calendar day.
#[derive(Debug, Clone, Default)]
pub struct DailyAccumulator {
    pub orders: DistinctAccumulator,
    /// Sum of payment values over every row of the day (not per order).
    pub revenue: f64,
}

impl DailyAccumulator {
    pub fn add(&mut self, order_id: ValueId, payment: Option<f64>) {
        self.orders.add(order_id);
        if let Some(value) = payment {
            self.revenue += value;
        }
    }
}

/// Rows bucketed by calendar day of their purchase timestamp.
#[derive(Debug, Clone, Default)]
pub struct DailyCache {
    days: BTreeMap<NaiveDate, DailyAccumulator>,
}

impl DailyCache {
    /// Buckets every row with a purchase timestamp; rows without one are skipped.
    pub fn build(
        table: &OrderTable,
        timestamp_field: FieldIndex,
        order_field: FieldIndex,
        payment_field: FieldIndex,
    ) -> Self {
        let mut cache = DailyCache::default();
        for record in table.records() {
            let Some(day) = table.day(record, timestamp_field) else {
                continue;
            };
            cache
                .days
                .entry(day)
                .or_default()
                .add(record.value_id(order_field), table.number(record, payment_field));
        }
        cache
    }

    /// First and last day that received rows.
    pub fn span(&self) -> Option<DateRange> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some(DateRange::new(first, last))
    }

    pub fn get(&self, day: NaiveDate) -> Option<&DailyAccumulator> {
        self.days.get(&day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_accumulator_ignores_empty_ids() {
        let mut acc = DistinctAccumulator::new();
        acc.add(1);
        acc.add(1);
        acc.add(VALUE_ID_EMPTY);
        acc.add(2);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.rows, 4);
    }

    #[test]
    fn test_group_cache_keeps_first_seen_order() {
        let mut cache = GroupCache::default();
        cache.add(7, 1);
        cache.add(3, 1);
        cache.add(7, 2);
        let keys: Vec<ValueId> = cache.groups().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![7, 3]);
        assert_eq!(cache.groups().next().unwrap().1.count(), 2);
    }

    #[test]
    fn test_take_empty_and_merge() {
        let mut cache = GroupCache::default();
        assert!(cache.is_empty());
        cache.add(VALUE_ID_EMPTY, 1);
        cache.add(5, 2);
        cache.add(6, 3);

        let empty = cache.take_empty().unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
        assert!(cache.take_empty().is_none());

        cache.merge_into(6, &empty);
        cache.add(5, 4);
        let counts: Vec<(ValueId, u64)> = cache.groups().map(|(k, a)| (k, a.count())).collect();
        assert_eq!(counts, vec![(5, 2), (6, 2)]);
    }

    #[test]
    fn test_daily_accumulator_sums_every_row() {
        let mut acc = DailyAccumulator::default();
        acc.add(1, Some(10.0));
        acc.add(1, Some(5.0));
        acc.add(2, None);
        assert_eq!(acc.orders.count(), 2);
        assert_eq!(acc.revenue, 15.0);
    }
}
