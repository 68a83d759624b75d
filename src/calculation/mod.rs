//! Calculation logic for the time & attendance engine.
//!
//! This module contains the minute-axis arithmetic, punch rounding, the
//! daily calculator shared by every regime, the monthly aggregator with its
//! per-regime folds, and the builders that turn clock punches or work-slot
//! templates into time-cards.

mod card_builder;
mod daily;
mod monthly;
mod rounding;
mod time_arithmetic;

pub use card_builder::{card_from_record, card_from_slot, time_of_day_at};
pub use daily::{DailyCalculation, calculate_daily};
pub use monthly::{
    ESTIMATED_OVERTIME_EXCEEDED, MONTHLY_OVERTIME_CAP_EXCEEDED, MonthlyAggregation,
    WEEKLY_THRESHOLD_EXCEEDED, aggregate_month,
};
pub use rounding::{round_axis_seconds, round_edge, round_edge_seconds, round_minute};
pub use time_arithmetic::{
    AXIS_END, LATE_NIGHT_END, LATE_NIGHT_START, MINUTES_PER_DAY, MinuteSpan, axis_position,
    intersect_minutes, late_night_minutes, late_night_windows, span_minutes, to_minutes_of_day,
};
