//! Calculation policies referenced by staff contracts.
//!
//! An [`OvertimePattern`] selects one of four regimes (premium, monthly
//! range, variable working time, flextime) and carries the thresholds they
//! share. A [`TimePunch`] decides how clock punches are rounded.

mod overtime_pattern;
mod time_punch;

pub use overtime_pattern::{
    LegalHours, LegalHoursTable, MAX_LEGAL_HOURS, OvertimePattern, PolicyVariant, SharedConfig,
};
pub use time_punch::{Edge, EdgeRounding, ROUNDING_UNITS, RoundingDirection, TimePunch};
