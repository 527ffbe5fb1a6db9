//! Interval value types for reservation slots.
//!
//! A slot is an inclusive date range plus a daily time window; the window
//! applies to every date in the range. Overlap is closed-interval on both
//! components: two intervals intersect iff `max(start) <= min(end)`, so
//! ranges that merely touch (one ends exactly where the other begins)
//! count as overlapping.

use chrono::{NaiveDate, NaiveTime};

/// Inclusive calendar-date range. `start <= end` is enforced by the
/// engine before a slot reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) <= self.end.min(other.end)
    }
}

/// Daily time window. For a single-day range the window must be
/// non-empty (`start < end`); for multi-day ranges the ordering is
/// advisory and each day is treated as bounded by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) <= self.end.min(other.end)
    }
}

/// A reservation's claim on a machine: every date in `dates`, during
/// `window` each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub dates: DateRange,
    pub window: TimeWindow,
}

impl Slot {
    #[must_use]
    pub const fn new(dates: DateRange, window: TimeWindow) -> Self {
        Self { dates, window }
    }

    /// Two slots collide when their date ranges intersect and their
    /// daily windows intersect on the shared date(s).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.dates.overlaps(&other.dates) && self.window.overlaps(&other.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn slot(sd: &str, ed: &str, st: &str, et: &str) -> Slot {
        Slot::new(
            DateRange::new(date(sd), date(ed)),
            TimeWindow::new(time(st), time(et)),
        )
    }

    #[test]
    fn date_range_contains_is_inclusive() {
        let range = DateRange::new(date("2024-01-10"), date("2024-01-12"));
        assert!(range.contains(date("2024-01-10")));
        assert!(range.contains(date("2024-01-11")));
        assert!(range.contains(date("2024-01-12")));
        assert!(!range.contains(date("2024-01-09")));
        assert!(!range.contains(date("2024-01-13")));
    }

    #[test]
    fn date_ranges_touching_at_endpoints_overlap() {
        let a = DateRange::new(date("2024-01-10"), date("2024-01-12"));
        let b = DateRange::new(date("2024-01-12"), date("2024-01-15"));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_date_ranges_do_not_overlap() {
        let a = DateRange::new(date("2024-01-10"), date("2024-01-11"));
        let b = DateRange::new(date("2024-01-12"), date("2024-01-15"));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn time_windows_partially_overlapping() {
        let a = TimeWindow::new(time("09:00"), time("10:00"));
        let b = TimeWindow::new(time("09:30"), time("10:30"));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn time_windows_touching_count_as_overlap() {
        let a = TimeWindow::new(time("09:00"), time("10:00"));
        let b = TimeWindow::new(time("10:00"), time("11:00"));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn disjoint_time_windows() {
        let a = TimeWindow::new(time("09:00"), time("10:00"));
        let b = TimeWindow::new(time("10:01"), time("11:00"));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn slots_on_same_day_conflict_only_when_windows_cross() {
        let a = slot("2024-01-10", "2024-01-10", "09:00", "10:00");
        let b = slot("2024-01-10", "2024-01-10", "09:30", "10:30");
        let c = slot("2024-01-10", "2024-01-10", "11:00", "12:00");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn slots_on_disjoint_dates_never_conflict() {
        let a = slot("2024-01-10", "2024-01-10", "09:00", "10:00");
        let b = slot("2024-01-11", "2024-01-11", "09:00", "10:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn multi_day_slots_conflict_through_shared_dates() {
        let a = slot("2024-01-10", "2024-01-14", "08:00", "18:00");
        let b = slot("2024-01-14", "2024-01-16", "17:00", "20:00");
        assert!(a.overlaps(&b));

        // Same shared date, but the windows miss each other.
        let c = slot("2024-01-14", "2024-01-16", "19:00", "20:00");
        assert!(!a.overlaps(&c));
    }
}
