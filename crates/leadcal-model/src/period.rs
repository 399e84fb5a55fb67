//! Calendar periods and day-level date keys

use crate::contact::ContactEvent;
use crate::error::{ModelError, ModelResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Day-level date parsed from the first 10 characters of a raw date
///
/// Only the digit groups at `[0..4]`, `[5..7]` and `[8..10]` are read; the
/// separators are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    pub day: u32,
}

impl DayKey {
    /// Parse a raw date such as `2026-10-18` or `2026-10-18T09:12:00`
    ///
    /// Returns `None` when fewer than 10 characters are present or any digit
    /// group is not purely numeric.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let head = raw.get(..10)?;
        Some(Self {
            year: i32::try_from(digits(head.get(0..4)?)?).ok()?,
            month: digits(head.get(5..7)?)?,
            day: digits(head.get(8..10)?)?,
        })
    }

    /// Key for a calendar date
    #[inline]
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Month navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// One calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create period for `year`/`month` (1-based)
    ///
    /// # Errors
    /// Returns error if month is outside 1..=12 or the year is not representable
    pub fn new(year: i32, month: u32) -> ModelResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ModelError::invalid_period(year, month));
        }
        Ok(Self { year, month })
    }

    /// Period containing `date`
    #[inline]
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month
    #[inline]
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month (28..=31)
    #[must_use]
    pub fn days_in_month(&self) -> usize {
        let first = self.first_day();
        let next = self.next().first_day();
        // Both dates exist by construction.
        usize::try_from(next.signed_duration_since(first).num_days()).unwrap_or(31)
    }

    /// Length of a day-indexed array for this month (index 0 unused)
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.days_in_month() + 1
    }

    /// Day index for `key` if it falls inside this month
    #[inline]
    #[must_use]
    pub fn locate(&self, key: DayKey) -> Option<usize> {
        if key.year != self.year || key.month != self.month {
            return None;
        }
        let day = usize::try_from(key.day).ok()?;
        (1..=self.days_in_month()).contains(&day).then_some(day)
    }

    /// Day index of `event` within this month
    #[inline]
    #[must_use]
    pub fn day_index(&self, event: &ContactEvent) -> Option<usize> {
        self.locate(event.day_key()?)
    }

    /// Whether `date` falls inside this month
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Previous month, wrapping into the previous year
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Next month, wrapping into the next year
    #[must_use]
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Step one month in `direction`
    #[inline]
    #[must_use]
    pub fn navigate(&self, direction: Direction) -> Self {
        match direction {
            Direction::Previous => self.previous(),
            Direction::Next => self.next(),
        }
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_plain_day() {
        let key = DayKey::parse("2026-10-18").unwrap();
        assert_eq!((key.year, key.month, key.day), (2026, 10, 18));
    }

    #[test]
    fn parse_uses_first_ten_characters() {
        let key = DayKey::parse("2026-02-09T23:59:59.000Z").unwrap();
        assert_eq!((key.year, key.month, key.day), (2026, 2, 9));
    }

    #[test]
    fn parse_rejects_short_and_garbled() {
        assert!(DayKey::parse("2026-1-1").is_none());
        assert!(DayKey::parse("").is_none());
        assert!(DayKey::parse("2026-xx-01").is_none());
        assert!(DayKey::parse("abcd-10-01").is_none());
    }

    #[test]
    fn parse_ignores_separators() {
        let key = DayKey::parse("2026/10/01").unwrap();
        assert_eq!((key.year, key.month, key.day), (2026, 10, 1));
        let period = Period::new(2026, 10).unwrap();
        assert_eq!(period.locate(key), Some(1));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(Period::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(Period::new(2026, 2).unwrap().days_in_month(), 28);
        assert_eq!(Period::new(2026, 10).unwrap().days_in_month(), 31);
        assert_eq!(Period::new(2026, 11).unwrap().days_in_month(), 30);
        assert_eq!(Period::new(2026, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn invalid_month_rejected() {
        assert!(Period::new(2026, 0).is_err());
        assert!(Period::new(2026, 13).is_err());
    }

    #[test]
    fn locate_checks_period_and_range() {
        let period = Period::new(2026, 2).unwrap();
        assert_eq!(period.locate(DayKey::parse("2026-02-28").unwrap()), Some(28));
        assert_eq!(period.locate(DayKey::parse("2026-02-29").unwrap()), None);
        assert_eq!(period.locate(DayKey::parse("2026-02-00").unwrap()), None);
        assert_eq!(period.locate(DayKey::parse("2026-03-01").unwrap()), None);
        assert_eq!(period.locate(DayKey::parse("2025-02-01").unwrap()), None);
    }

    #[test]
    fn navigation_wraps_years() {
        let jan = Period::new(2026, 1).unwrap();
        assert_eq!(jan.previous(), Period::new(2025, 12).unwrap());
        assert_eq!(jan.navigate(Direction::Previous).navigate(Direction::Next), jan);
        assert_eq!(Period::new(2026, 12).unwrap().next(), Period::new(2027, 1).unwrap());
    }

    #[test]
    fn display_pads_month() {
        assert_eq!(Period::new(2026, 3).unwrap().to_string(), "2026-03");
    }

    proptest! {
        #[test]
        fn prop_every_day_of_month_locates(year in 1990i32..2100, month in 1u32..=12) {
            let period = Period::new(year, month).unwrap();
            for day in 1..=period.days_in_month() {
                let raw = format!("{year:04}-{month:02}-{day:02}");
                prop_assert_eq!(period.locate(DayKey::parse(&raw).unwrap()), Some(day));
            }
            prop_assert_eq!(period.slot_count(), period.days_in_month() + 1);
        }
    }
}
