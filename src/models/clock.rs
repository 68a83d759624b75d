//! Civil clock values.
//!
//! Times are persisted as `(HH:MM, next_day)` pairs in the tenant's civil
//! time zone rather than as instants, so the late-night window is always
//! evaluated against the local wall clock of the card's date.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A wall-clock time relative to a base date, optionally on the following day.
///
/// # Example
///
/// ```
/// use kintai_engine::models::TimeOfDay;
///
/// let end = TimeOfDay::hm(5, 0).unwrap().on_next_day();
/// assert_eq!(end.to_string(), "05:00(+1)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// The wall-clock time.
    pub time: NaiveTime,
    /// Whether the time falls on the day after the base date.
    #[serde(default)]
    pub next_day: bool,
}

impl TimeOfDay {
    /// Builds a same-day time from hours and minutes.
    pub fn hm(hour: u32, minute: u32) -> EngineResult<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            EngineError::invalid_interval(format!("{hour:02}:{minute:02} is not a clock time"))
        })?;
        Ok(Self {
            time,
            next_day: false,
        })
    }

    /// Returns the same clock time flagged as next-day.
    pub fn on_next_day(self) -> Self {
        Self {
            next_day: true,
            ..self
        }
    }

    /// Minutes since midnight of the wall-clock time, ignoring the next-day flag.
    pub fn minute_of_day(&self) -> u32 {
        self.time.hour() * 60 + self.time.minute()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))?;
        if self.next_day {
            write!(f, "(+1)")?;
        }
        Ok(())
    }
}

/// A calendar month, the key of a monthly time-sheet.
///
/// Deserialization goes through [`YearMonth::new`], so month numbers outside
/// 1-12 are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = EngineError;

    fn try_from(raw: RawYearMonth) -> EngineResult<Self> {
        Self::new(raw.year, raw.month)
    }
}

impl YearMonth {
    /// Creates a year-month, rejecting month numbers outside 1-12.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::invalid_interval(format!(
                "{year}-{month:02} is not a calendar month"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month a date belongs to.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    /// Number of days in the month (28-31).
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Whether the date falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Formats a minute count as `H:MM`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_rejects_invalid_clock() {
        assert!(TimeOfDay::hm(24, 0).is_err());
        assert!(TimeOfDay::hm(9, 60).is_err());
        assert_eq!(TimeOfDay::hm(22, 30).unwrap().minute_of_day(), 1350);
    }

    #[test]
    fn test_time_of_day_display() {
        assert_eq!(TimeOfDay::hm(9, 5).unwrap().to_string(), "09:05");
        assert_eq!(
            TimeOfDay::hm(5, 0).unwrap().on_next_day().to_string(),
            "05:00(+1)"
        );
    }

    #[test]
    fn test_time_of_day_deserializes_without_flag() {
        let parsed: TimeOfDay = serde_json::from_str(r#"{"time":"13:00:00"}"#).unwrap();
        assert_eq!(parsed, TimeOfDay::hm(13, 0).unwrap());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(YearMonth::new(2023, 4).unwrap().days_in_month(), 30);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2023, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_year_month_rejects_month_13() {
        assert!(YearMonth::new(2023, 13).is_err());
        assert!(YearMonth::new(2023, 0).is_err());
    }

    #[test]
    fn test_year_month_deserialize_validates() {
        let april: YearMonth = serde_json::from_str(r#"{"year":2023,"month":4}"#).unwrap();
        assert_eq!(april, YearMonth::new(2023, 4).unwrap());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2023,"month":13}"#).is_err());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2023,"month":0}"#).is_err());
    }

    #[test]
    fn test_year_month_contains() {
        let april = YearMonth::new(2023, 4).unwrap();
        assert!(april.contains(NaiveDate::from_ymd_opt(2023, 4, 30).unwrap()));
        assert!(!april.contains(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()));
        assert_eq!(april.to_string(), "2023-04");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(555), "9:15");
        assert_eq!(format_minutes(0), "0:00");
    }
}
