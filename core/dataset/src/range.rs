//! FILENAME: core/dataset/src/range.rs
//! Inclusive calendar-day ranges used to slice order tables.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An immutable, inclusive range of calendar days.
///
/// A range whose `start` is after its `end` is legal and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        DateRange { start: day, end: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of calendar days covered (0 for an empty range).
    pub fn day_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Every day of the range in chronological order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count())
    }

    /// Intersection with another range; empty when they do not overlap.
    pub fn clamp_to(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_are_inclusive() {
        let range = DateRange::new(day(2018, 2, 27), day(2018, 3, 1));
        let days: Vec<_> = range.days().collect();
        assert_eq!(days, vec![day(2018, 2, 27), day(2018, 2, 28), day(2018, 3, 1)]);
        assert!(range.contains(day(2018, 3, 1)));
        assert!(!range.contains(day(2018, 3, 2)));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = DateRange::new(day(2018, 3, 2), day(2018, 3, 1));
        assert!(range.is_empty());
        assert_eq!(range.day_count(), 0);
        assert_eq!(range.days().count(), 0);
        assert!(!range.contains(day(2018, 3, 1)));
    }

    #[test]
    fn test_clamp_intersects() {
        let data = DateRange::new(day(2017, 1, 1), day(2017, 12, 31));
        let wanted = DateRange::new(day(2016, 6, 1), day(2017, 1, 31));
        assert_eq!(wanted.clamp_to(&data), DateRange::new(day(2017, 1, 1), day(2017, 1, 31)));

        let disjoint = DateRange::new(day(2019, 1, 1), day(2019, 1, 2));
        assert!(disjoint.clamp_to(&data).is_empty());
    }

    #[test]
    fn test_serializes_as_iso_dates() {
        let range = DateRange::single_day(day(2018, 1, 1));
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"start":"2018-01-01","end":"2018-01-01"}"#);
    }
}
