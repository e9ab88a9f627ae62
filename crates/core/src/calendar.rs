use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `CalendarError::InvertedRange` if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if end < start {
            return Err(CalendarError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, counting both endpoints. Never zero.
    #[must_use]
    #[allow(clippy::len_without_is_empty, clippy::cast_sign_loss)]
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Signed number of days from the start to `date`.
    #[must_use]
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }
}

/// Storage/lookup key for a date (`YYYY-MM-DD`).
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` key; anything else yields `None`.
#[must_use]
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Day/month/year rendering used by front-ends.
#[must_use]
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Sunday that opens the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn length_counts_both_endpoints() {
        let range = DateRange::new(d(2026, 1, 16), d(2026, 3, 16)).unwrap();
        assert_eq!(range.len(), 60);
        assert_eq!(DateRange::new(d(2026, 1, 1), d(2026, 1, 1)).unwrap().len(), 1);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            DateRange::new(d(2026, 2, 1), d(2026, 1, 1)),
            Err(CalendarError::InvertedRange { .. })
        ));
    }

    #[test]
    fn iterates_in_calendar_order_across_month_end() {
        let range = DateRange::new(d(2026, 1, 30), d(2026, 2, 2)).unwrap();
        let days: Vec<_> = range.iter().collect();
        assert_eq!(days, vec![d(2026, 1, 30), d(2026, 1, 31), d(2026, 2, 1), d(2026, 2, 2)]);
        assert_eq!(days.len(), range.len());
    }

    #[test]
    fn date_keys_round_trip_and_reject_garbage() {
        assert_eq!(date_key(d(2026, 3, 5)), "2026-03-05");
        assert_eq!(parse_date_key("2026-03-05"), Some(d(2026, 3, 5)));
        assert_eq!(parse_date_key("05/03/2026"), None);
        assert_eq!(display_date(d(2026, 3, 5)), "05/03/2026");
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2026-01-21 is a Wednesday
        assert_eq!(week_start(d(2026, 1, 21)), d(2026, 1, 18));
        assert_eq!(week_start(d(2026, 1, 18)), d(2026, 1, 18));
    }
}
