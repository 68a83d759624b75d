//! Dispatch start date and conflict date of a staff member at one client.
//!
//! Continuous dispatch of a fixed-term staff member to the same client unit
//! is limited to three years from the dispatch start. A gap of more than
//! three months (three months and one day or longer) resets the start.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::AssignmentPeriod;

/// Months the conflict date lies after the dispatch start.
pub const CONFLICT_PERIOD_MONTHS: u32 = 36;

/// Months of gap after which dispatch is counted afresh.
pub const COOLING_OFF_MONTHS: u32 = 3;

/// The result of a conflict-date calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDate {
    /// Start of the current continuous dispatch.
    pub dispatch_start_date: NaiveDate,
    /// The date continuous dispatch reaches its limit.
    pub conflict_date: NaiveDate,
}

fn cooling_off_end(end: NaiveDate) -> Option<NaiveDate> {
    end.checked_add_months(Months::new(COOLING_OFF_MONTHS))?
        .checked_add_days(Days::new(1))
}

/// The start of the current continuous dispatch over a set of periods.
///
/// Periods are walked in start order against the latest coverage end seen
/// so far; open-ended coverage never resets.
pub fn dispatch_start_date(periods: &[AssignmentPeriod]) -> Option<NaiveDate> {
    let mut sorted = periods.to_vec();
    sorted.sort_by_key(|p| p.start);

    let (first, rest) = sorted.split_first()?;
    let mut start = first.start;
    // None means open-ended coverage
    let mut covered_until = first.end;

    for period in rest {
        let reset = covered_until
            .and_then(cooling_off_end)
            .is_some_and(|resume| period.start >= resume);
        if reset {
            start = period.start;
        }
        covered_until = match (covered_until, period.end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }

    Some(start)
}

/// Dispatch start plus three years, when any period exists.
pub fn conflict_date(periods: &[AssignmentPeriod]) -> Option<ConflictDate> {
    let dispatch_start_date = dispatch_start_date(periods)?;
    let conflict_date =
        dispatch_start_date.checked_add_months(Months::new(CONFLICT_PERIOD_MONTHS))?;
    Some(ConflictDate {
        dispatch_start_date,
        conflict_date,
    })
}
