//! Punch rounding.
//!
//! Rounding works on the two-day minute axis for time-card edges, and on
//! seconds for raw clock punches so that a punch at 08:52:30 rounds the same
//! way a wall clock would. A one-minute unit only drops the seconds.

use crate::policy::{Edge, EdgeRounding, RoundingDirection, TimePunch};

/// Rounds a minute value to a multiple of `unit`.
///
/// # Examples
///
/// ```
/// use kintai_engine::calculation::round_minute;
/// use kintai_engine::policy::RoundingDirection;
///
/// assert_eq!(round_minute(532, 15, RoundingDirection::Up), 540);
/// assert_eq!(round_minute(532, 15, RoundingDirection::Down), 525);
/// assert_eq!(round_minute(532, 15, RoundingDirection::Nearest), 525);
/// ```
pub fn round_minute(value: u32, unit: u32, direction: RoundingDirection) -> u32 {
    if unit <= 1 {
        return value;
    }
    match direction {
        RoundingDirection::Up => value.div_ceil(unit) * unit,
        RoundingDirection::Down => value / unit * unit,
        RoundingDirection::Nearest => (2 * value + unit) / (2 * unit) * unit,
    }
}

/// Rounds a second offset on the axis to whole minutes.
///
/// Units of one minute or less truncate the seconds whatever the direction.
pub fn round_axis_seconds(seconds: u32, unit: u32, direction: RoundingDirection) -> u32 {
    if unit <= 1 {
        return seconds / 60;
    }
    let unit_seconds = unit * 60;
    let rounded = match direction {
        RoundingDirection::Up => seconds.div_ceil(unit_seconds) * unit_seconds,
        RoundingDirection::Down => seconds / unit_seconds * unit_seconds,
        RoundingDirection::Nearest => (2 * seconds + unit_seconds) / (2 * unit_seconds) * unit_seconds,
    };
    rounded / 60
}

/// Rounds an edge on the minute axis under an optional policy.
pub fn round_edge(value: u32, edge: Edge, policy: Option<&TimePunch>) -> u32 {
    let rule = policy.map_or(EdgeRounding::EXACT, |p| p.rule_for(edge));
    round_minute(value, rule.unit, rule.direction)
}

/// Rounds a second offset for an edge under an optional policy.
pub fn round_edge_seconds(seconds: u32, edge: Edge, policy: Option<&TimePunch>) -> u32 {
    let rule = policy.map_or(EdgeRounding::EXACT, |p| p.rule_for(edge));
    round_axis_seconds(seconds, rule.unit, rule.direction)
}
