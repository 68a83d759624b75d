//! Minute-precision clock arithmetic on a two-day axis.
//!
//! A time-card's span is placed on an axis running from minute 0 (midnight
//! of the card's date) to minute 2880 (midnight two days later). Next-day
//! times sit in the upper half. The late-night window of the card's date is
//! `[1320, 1740)`, i.e. 22:00 to 05:00 the next morning; the same window
//! shifted one day back or forward covers early-morning work on either day.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::TimeOfDay;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Length of the two-day axis.
pub const AXIS_END: u32 = 2 * MINUTES_PER_DAY;

/// Start of the late-night window (22:00).
pub const LATE_NIGHT_START: u32 = 22 * 60;

/// End of the late-night window on the axis (05:00 the next day).
pub const LATE_NIGHT_END: u32 = MINUTES_PER_DAY + 5 * 60;

/// A half-open interval `[start, end)` on the two-day axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteSpan {
    /// Inclusive start.
    pub start: u32,
    /// Exclusive end.
    pub end: u32,
}

impl MinuteSpan {
    /// Creates a span, failing when it would run backwards or leave the axis.
    pub fn new(start: u32, end: u32) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::invalid_interval(format!(
                "span ends at minute {end} before it starts at minute {start}"
            )));
        }
        if end > AXIS_END {
            return Err(EngineError::invalid_interval(format!(
                "minute {end} is beyond the two-day axis"
            )));
        }
        Ok(Self { start, end })
    }

    /// Places a start/end pair on the axis.
    ///
    /// The start sits at its own position (shifted by a day when flagged
    /// next-day); the end is placed [`span_minutes`] after it.
    pub fn from_times(start: &TimeOfDay, end: &TimeOfDay) -> EngineResult<Self> {
        let length = span_minutes(
            start.minute_of_day(),
            start.next_day,
            end.minute_of_day(),
            end.next_day,
        )?;
        let start_abs = axis_position(start);
        Self::new(start_abs, start_abs + length)
    }

    /// Length in minutes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Minutes since midnight for an hour and minute, wrapped into `[0, 1440)`.
pub fn to_minutes_of_day(hour: u32, minute: u32) -> u32 {
    (hour * 60 + minute) % MINUTES_PER_DAY
}

/// Position of a clock value on the two-day axis.
pub fn axis_position(time: &TimeOfDay) -> u32 {
    time.minute_of_day() + if time.next_day { MINUTES_PER_DAY } else { 0 }
}

/// Length of a start/end pair in minutes.
///
/// The end is pushed one day later when it is flagged next-day and the
/// start is not. Equal times with equal flags give 0; a result that would
/// be negative is an [`EngineError::InvalidInterval`].
///
/// # Examples
///
/// ```
/// use kintai_engine::calculation::span_minutes;
///
/// // 22:00 to 05:00 the next morning
/// assert_eq!(span_minutes(1320, false, 300, true).unwrap(), 420);
/// assert!(span_minutes(600, false, 540, false).is_err());
/// ```
pub fn span_minutes(
    start: u32,
    start_next_day: bool,
    end: u32,
    end_next_day: bool,
) -> EngineResult<u32> {
    let end = if end_next_day && !start_next_day {
        end + MINUTES_PER_DAY
    } else {
        end
    };
    end.checked_sub(start).ok_or_else(|| {
        EngineError::invalid_interval(format!(
            "end minute {end} is before start minute {start}"
        ))
    })
}

/// Overlap of two half-open spans in minutes.
pub fn intersect_minutes(a: MinuteSpan, b: MinuteSpan) -> u32 {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    end.saturating_sub(start)
}

/// The late-night window of the card's date, shifted back and forward one
/// day and clipped to the axis.
pub fn late_night_windows() -> [MinuteSpan; 3] {
    [
        // 00:00-05:00 on the card's date, the tail of the previous night
        MinuteSpan {
            start: 0,
            end: LATE_NIGHT_END - MINUTES_PER_DAY,
        },
        MinuteSpan {
            start: LATE_NIGHT_START,
            end: LATE_NIGHT_END,
        },
        MinuteSpan {
            start: LATE_NIGHT_START + MINUTES_PER_DAY,
            end: AXIS_END,
        },
    ]
}

/// Minutes of a span that fall inside any late-night window.
pub fn late_night_minutes(span: MinuteSpan) -> u32 {
    late_night_windows()
        .iter()
        .map(|window| intersect_minutes(span, *window))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> TimeOfDay {
        TimeOfDay::hm(h, m).unwrap()
    }

    #[test]
    fn test_to_minutes_of_day() {
        assert_eq!(to_minutes_of_day(0, 0), 0);
        assert_eq!(to_minutes_of_day(22, 0), 1320);
        assert_eq!(to_minutes_of_day(23, 59), 1439);
        assert_eq!(to_minutes_of_day(24, 0), 0);
    }

    #[test]
    fn test_span_equal_times_is_zero() {
        assert_eq!(span_minutes(540, false, 540, false).unwrap(), 0);
        assert_eq!(span_minutes(60, true, 60, true).unwrap(), 0);
    }

    #[test]
    fn test_span_negative_is_invalid() {
        let error = span_minutes(1080, false, 540, false).unwrap_err();
        assert!(matches!(error, EngineError::InvalidInterval { .. }));
    }

    #[test]
    fn test_span_over_midnight() {
        assert_eq!(span_minutes(1200, false, 300, true).unwrap(), 540);
    }

    #[test]
    fn test_span_from_times_places_next_day_start() {
        let span = MinuteSpan::from_times(&t(1, 0).on_next_day(), &t(5, 0).on_next_day()).unwrap();
        assert_eq!(span, MinuteSpan { start: 1500, end: 1740 });
    }

    #[test]
    fn test_intersect_disjoint_is_zero() {
        let a = MinuteSpan::new(0, 100).unwrap();
        let b = MinuteSpan::new(100, 200).unwrap();
        assert_eq!(intersect_minutes(a, b), 0);
    }

    #[test]
    fn test_late_night_full_night_shift() {
        let span = MinuteSpan::from_times(&t(22, 0), &t(5, 0).on_next_day()).unwrap();
        assert_eq!(late_night_minutes(span), 420);
    }

    #[test]
    fn test_late_night_evening_tail() {
        let span = MinuteSpan::from_times(&t(13, 0), &t(23, 0)).unwrap();
        assert_eq!(late_night_minutes(span), 60);
    }

    #[test]
    fn test_late_night_early_morning_start() {
        // 03:00-12:00 on the card's date: two hours before 05:00
        let span = MinuteSpan::from_times(&t(3, 0), &t(12, 0)).unwrap();
        assert_eq!(late_night_minutes(span), 120);
    }

    #[test]
    fn test_late_night_second_night() {
        // 20:00 to 23:30 the next day touches both nights
        let span = MinuteSpan::from_times(&t(20, 0), &t(23, 30).on_next_day()).unwrap();
        assert_eq!(late_night_minutes(span), 420 + 90);
    }

    proptest! {
        #[test]
        fn prop_late_night_never_exceeds_span(start in 0u32..1440, length in 0u32..1440) {
            let span = MinuteSpan::new(start, start + length).unwrap();
            prop_assert!(late_night_minutes(span) <= span.len());
        }

        #[test]
        fn prop_span_plus_start_recovers_end(start in 0u32..1440, end in 0u32..1440) {
            let length = span_minutes(start, false, end, true).unwrap();
            prop_assert_eq!(start + length, end + MINUTES_PER_DAY);
        }
    }
}
