//! Calendar months, the period that records, budgets and summaries are scoped to.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month, UtcOffset};

use crate::{Error, timezone::local_now};

/// A calendar month such as "2025-03".
///
/// Internally this is the first day of the month, so every value is a valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth(Date);

impl YearMonth {
    /// The month containing `date`.
    pub fn from_date(date: Date) -> Self {
        Self(date.replace_day(1).unwrap_or(date))
    }

    /// The current month at `local_offset`.
    pub fn current(local_offset: UtcOffset) -> Self {
        Self::from_date(time::OffsetDateTime::now_utc().to_offset(local_offset).date())
    }

    /// The current month in a canonical timezone, e.g. "Asia/Seoul".
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezoneError] if the timezone is not recognised.
    pub fn current_in(canonical_timezone: &str) -> Result<Self, Error> {
        local_now(canonical_timezone)
            .map(|now| Self::from_date(now.date()))
            .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> Month {
        self.0.month()
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        self.0
    }

    /// The last day of the month, e.g. the 29th for February in a leap year.
    pub fn last_day(self) -> Date {
        let mut day = self.0;

        while let Some(next_day) = day.next_day() {
            if next_day.month() != day.month() {
                break;
            }

            day = next_day;
        }

        day
    }

    /// All days of the month.
    pub fn date_range(self) -> RangeInclusive<Date> {
        self.first_day()..=self.last_day()
    }

    /// The month before this one.
    pub fn previous(self) -> Self {
        self.0
            .previous_day()
            .map(Self::from_date)
            .unwrap_or(self)
    }

    /// The month after this one.
    pub fn next(self) -> Self {
        self.last_day()
            .next_day()
            .map(Self::from_date)
            .unwrap_or(self)
    }

    pub fn contains(self, date: Date) -> bool {
        self.date_range().contains(&date)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month() as u8)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse a month written as `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidYearMonth(s.to_owned());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Date::from_calendar_date(year, month, 1)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The `?month=YYYY-MM` query parameter used by the monthly pages.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month to display, defaults to the current month.
    pub month: Option<YearMonth>,
}
