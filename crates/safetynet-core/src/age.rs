//! Age computation from textual birthdates.
//!
//! Birthdates are stored as `MM/dd/yyyy`. Anything that does not parse,
//! or lies in the future, is an unknown age: the containing query still
//! succeeds and reports the [`UNKNOWN_AGE`] sentinel.
//!
//! The current date comes from a [`Clock`] so tests can pin "today".

use core::fmt;

use chrono::{Local, NaiveDate};

/// Format of the `birthdate` field.
pub const BIRTHDATE_FORMAT: &str = "%m/%d/%Y";

/// Sentinel age reported for a missing or unreadable birthdate.
pub const UNKNOWN_AGE: i32 = -1;

/// Oldest age still counted as a child.
pub const CHILD_MAX_AGE: i32 = 18;

/// Source of the current calendar date.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    /// Pin the clock to `today`.
    pub const fn new(today: NaiveDate) -> Self {
        Self(today)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whole years between `birthdate` and `today`.
///
/// `None` if the text does not parse or the date is after `today`.
pub fn age_on(birthdate: &str, today: NaiveDate) -> Option<u32> {
    let born = NaiveDate::parse_from_str(birthdate.trim(), BIRTHDATE_FORMAT).ok()?;
    today.years_since(born)
}

/// Age in whole years as of `clock.today()`, or [`UNKNOWN_AGE`].
pub fn age_from_birthdate(birthdate: Option<&str>, clock: &dyn Clock) -> i32 {
    birthdate
        .and_then(|text| age_on(text, clock.today()))
        .and_then(|years| i32::try_from(years).ok())
        .unwrap_or(UNKNOWN_AGE)
}

/// Where an age falls for head counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    /// 0 through [`CHILD_MAX_AGE`] inclusive.
    Child,
    /// Older than [`CHILD_MAX_AGE`].
    Adult,
    /// No usable birthdate.
    Unknown,
}

impl AgeGroup {
    /// Classify an age, treating negatives as unknown.
    pub const fn of(age: i32) -> Self {
        if age < 0 {
            Self::Unknown
        } else if age <= CHILD_MAX_AGE {
            Self::Child
        } else {
            Self::Adult
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn whole_years_elapsed() {
        let clock = FixedClock::new(date(2024, 3, 6));
        assert_eq!(age_from_birthdate(Some("03/06/1984"), &clock), 40);
        assert_eq!(age_from_birthdate(Some("03/07/1984"), &clock), 39);
        assert_eq!(age_from_birthdate(Some("03/06/2012"), &clock), 12);
    }

    #[test]
    fn born_today_is_zero() {
        let clock = FixedClock::new(date(2024, 1, 1));
        assert_eq!(age_from_birthdate(Some("01/01/2024"), &clock), 0);
    }

    #[test]
    fn unusable_input_is_unknown() {
        let clock = FixedClock::new(date(2024, 1, 1));
        assert_eq!(age_from_birthdate(None, &clock), UNKNOWN_AGE);
        assert_eq!(age_from_birthdate(Some(""), &clock), UNKNOWN_AGE);
        assert_eq!(age_from_birthdate(Some("1984-03-06"), &clock), UNKNOWN_AGE);
        assert_eq!(age_from_birthdate(Some("13/45/1984"), &clock), UNKNOWN_AGE);
        assert_eq!(age_from_birthdate(Some("03/06/2030"), &clock), UNKNOWN_AGE);
    }

    #[test]
    fn leap_day_birthdays() {
        assert_eq!(age_on("02/29/2000", date(2023, 2, 28)), Some(22));
        assert_eq!(age_on("02/29/2000", date(2023, 3, 1)), Some(23));
    }

    #[test]
    fn eighteen_is_a_child() {
        assert_eq!(AgeGroup::of(18), AgeGroup::Child);
        assert_eq!(AgeGroup::of(0), AgeGroup::Child);
        assert_eq!(AgeGroup::of(19), AgeGroup::Adult);
        assert_eq!(AgeGroup::of(UNKNOWN_AGE), AgeGroup::Unknown);
    }

    #[test]
    fn system_clock_reports_a_date() {
        let today = SystemClock.today();
        assert!(age_on("01/01/1900", today).is_some());
    }
}
