//! Daily calculation.
//!
//! This module derives the worked, overtime, late-night and weekend minutes
//! of one time-card under its contract's overtime pattern. The same daily
//! layer is shared by all four regimes; only whether daily overtime is
//! written onto the card depends on the regime.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, DailyTimeCard, WorkType, format_minutes};
use crate::policy::{Edge, OvertimePattern, TimePunch};

use super::rounding::round_edge;
use super::time_arithmetic::{MinuteSpan, late_night_minutes};

/// Derived values for one time-card, with the audit steps that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCalculation {
    /// The rounded span on the two-day axis; `None` for non-work days.
    pub span: Option<MinuteSpan>,
    /// Minutes between rounded start and end.
    pub gross_span: u32,
    /// Normal plus late-night break minutes.
    pub total_break: u32,
    /// Worked minutes.
    pub work_minutes: u32,
    /// Minutes beyond the daily threshold.
    pub overtime_minutes: u32,
    /// Worked minutes inside the late-night window.
    pub late_night_overtime_minutes: u32,
    /// Worked minutes on a Saturday or Sunday.
    pub holiday_work_minutes: u32,
    /// The audit steps recording this calculation.
    pub audit_steps: Vec<AuditStep>,
    /// Conditions that were tolerated rather than rejected.
    pub warnings: Vec<AuditWarning>,
}

impl DailyCalculation {
    fn non_work(card: &DailyTimeCard, step_number: u32) -> Self {
        let audit_step = AuditStep {
            step_number,
            rule_id: "daily_non_work_day".to_string(),
            rule_name: "Non-Work Day".to_string(),
            legal_ref: String::new(),
            input: serde_json::json!({
                "work_date": card.work_date,
                "work_type": card.work_type,
                "paid_leave_days": card.paid_leave_days.normalize().to_string(),
            }),
            output: serde_json::json!({"work_minutes": 0}),
            reasoning: format!(
                "{:?} on {} contributes no worked minutes",
                card.work_type, card.work_date
            ),
        };
        Self {
            span: None,
            gross_span: 0,
            total_break: 0,
            work_minutes: 0,
            overtime_minutes: 0,
            late_night_overtime_minutes: 0,
            holiday_work_minutes: 0,
            audit_steps: vec![audit_step],
            warnings: Vec::new(),
        }
    }

    /// Writes the derived fields onto the card.
    pub fn apply_to(&self, card: &mut DailyTimeCard) {
        card.work_minutes = self.work_minutes;
        card.overtime_minutes = self.overtime_minutes;
        card.late_night_overtime_minutes = self.late_night_overtime_minutes;
        card.holiday_work_minutes = self.holiday_work_minutes;
    }
}

/// Calculates one time-card.
///
/// # Arguments
///
/// * `card` - The time-card; only its input fields are read
/// * `pattern` - The contract's overtime pattern
/// * `punch` - The contract's rounding policy, if any
/// * `start_step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// - [`EngineError::InvalidTimeCard`] when a work day lacks start or end, or
///   paid leave carries no days
/// - [`EngineError::InvalidInterval`] when the entered span runs backwards
///   or the breaks exceed it
///
/// Rounding that carries the start past the end collapses the span to zero
/// worked minutes and adds a `ROUNDED_SPAN_COLLAPSED` warning.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use kintai_engine::calculation::calculate_daily;
/// use kintai_engine::models::{DailyTimeCard, TimeOfDay, WorkType};
/// use kintai_engine::policy::{OvertimePattern, PolicyVariant};
/// use uuid::Uuid;
///
/// let mut pattern = OvertimePattern::new("Premium", PolicyVariant::Premium);
/// pattern.shared.daily_overtime_enabled = true;
///
/// let card = DailyTimeCard::new(
///     Uuid::new_v4(),
///     Uuid::new_v4(),
///     NaiveDate::from_ymd_opt(2023, 4, 3).unwrap(),
///     WorkType::Work,
/// )
/// .with_times(TimeOfDay::hm(13, 0).unwrap(), TimeOfDay::hm(23, 0).unwrap())
/// .with_breaks(60, 0);
///
/// let result = calculate_daily(&card, &pattern, None, 1).unwrap();
/// assert_eq!(result.work_minutes, 540);
/// assert_eq!(result.overtime_minutes, 60);
/// assert_eq!(result.late_night_overtime_minutes, 60);
/// ```
pub fn calculate_daily(
    card: &DailyTimeCard,
    pattern: &OvertimePattern,
    punch: Option<&TimePunch>,
    start_step_number: u32,
) -> EngineResult<DailyCalculation> {
    if card.work_type != WorkType::Work {
        if card.work_type == WorkType::PaidLeave && card.paid_leave_days <= rust_decimal::Decimal::ZERO {
            return Err(EngineError::invalid_card(
                card.work_date,
                "paid leave requires paid_leave_days greater than 0",
            ));
        }
        return Ok(DailyCalculation::non_work(card, start_step_number));
    }

    let (Some(start), Some(end)) = (card.start, card.end) else {
        return Err(EngineError::invalid_card(
            card.work_date,
            "a work day requires both start and end times",
        ));
    };

    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut current_step = start_step_number;

    // Step 1: place the punches on the axis and round them
    let raw = MinuteSpan::from_times(&start, &end)?;
    let rounded_start = round_edge(raw.start, Edge::Start, punch);
    let rounded_end = round_edge(raw.end, Edge::End, punch);
    let collapsed = rounded_start > rounded_end;
    let span = if collapsed {
        warnings.push(AuditWarning::new(
            "ROUNDED_SPAN_COLLAPSED",
            format!(
                "rounding moved the start (minute {rounded_start}) past the end (minute {rounded_end}) on {}; no time is counted",
                card.work_date
            ),
            "medium",
        ));
        MinuteSpan::new(rounded_start, rounded_start)?
    } else {
        MinuteSpan::new(rounded_start, rounded_end)?
    };
    let gross_span = span.len();

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "daily_gross_span".to_string(),
        rule_name: "Gross Span".to_string(),
        legal_ref: String::new(),
        input: serde_json::json!({
            "start": start.to_string(),
            "end": end.to_string(),
            "raw_span": [raw.start, raw.end],
            "time_punch": punch.map(|p| p.name.clone()),
        }),
        output: serde_json::json!({
            "rounded_span": [span.start, span.end],
            "gross_span": gross_span,
        }),
        reasoning: format!(
            "{start} to {end} rounds to minutes {}-{} of the two-day axis, {} on site",
            span.start,
            span.end,
            format_minutes(gross_span)
        ),
    });
    current_step += 1;

    // Step 2: subtract breaks
    let total_break = card
        .break_minutes
        .checked_add(card.late_night_break_minutes)
        .ok_or_else(|| {
            EngineError::invalid_interval(format!(
                "break minutes overflow on {}",
                card.work_date
            ))
        })?;
    let work_minutes = match gross_span.checked_sub(total_break) {
        Some(minutes) => minutes,
        None if collapsed => 0,
        None => {
            return Err(EngineError::invalid_interval(format!(
                "breaks of {total_break} minutes exceed the {gross_span}-minute span on {}",
                card.work_date
            )));
        }
    };

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "daily_work_minutes".to_string(),
        rule_name: "Daily Work Minutes".to_string(),
        legal_ref: "Labour Standards Act art. 34".to_string(),
        input: serde_json::json!({
            "gross_span": gross_span,
            "break_minutes": card.break_minutes,
            "late_night_break_minutes": card.late_night_break_minutes,
        }),
        output: serde_json::json!({"work_minutes": work_minutes}),
        reasoning: format!(
            "{gross_span} minutes on site less {total_break} minutes of breaks"
        ),
    });
    current_step += 1;

    // Step 3: daily overtime, written onto the card for premium and variable only
    let threshold = pattern
        .variant
        .reports_daily_overtime()
        .then(|| pattern.shared.daily_threshold_minutes())
        .flatten();
    let overtime_minutes = threshold.map_or(0, |t| work_minutes.saturating_sub(t));

    let reasoning = match threshold {
        None => format!(
            "{} pattern reports no daily overtime on the time-card",
            pattern.variant.kind()
        ),
        Some(t) if overtime_minutes > 0 => format!(
            "{work_minutes} minutes worked exceeds the {t}-minute daily threshold by {overtime_minutes}"
        ),
        Some(t) => format!(
            "{work_minutes} minutes worked does not exceed the {t}-minute daily threshold"
        ),
    };
    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "daily_overtime".to_string(),
        rule_name: "Daily Overtime".to_string(),
        legal_ref: "Labour Standards Act art. 32(2), 37(1)".to_string(),
        input: serde_json::json!({
            "work_minutes": work_minutes,
            "kind": pattern.variant.kind(),
            "daily_threshold": threshold,
        }),
        output: serde_json::json!({"overtime_minutes": overtime_minutes}),
        reasoning,
    });
    current_step += 1;

    // Step 4: late-night minutes
    let in_window = late_night_minutes(span);
    let late_night_overtime_minutes = in_window
        .saturating_sub(card.late_night_break_minutes)
        .min(work_minutes);

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "daily_late_night".to_string(),
        rule_name: "Late-Night Minutes".to_string(),
        legal_ref: "Labour Standards Act art. 37(4)".to_string(),
        input: serde_json::json!({
            "rounded_span": [span.start, span.end],
            "minutes_in_window": in_window,
            "late_night_break_minutes": card.late_night_break_minutes,
        }),
        output: serde_json::json!({
            "late_night_overtime_minutes": late_night_overtime_minutes,
        }),
        reasoning: format!(
            "{in_window} minutes fall between 22:00 and 05:00, less {} minutes of late-night break",
            card.late_night_break_minutes
        ),
    });
    current_step += 1;

    // Step 5: weekend work
    let holiday_work_minutes = if card.is_weekend() { work_minutes } else { 0 };
    if holiday_work_minutes > 0 {
        audit_steps.push(AuditStep {
            step_number: current_step,
            rule_id: "daily_weekend_work".to_string(),
            rule_name: "Weekend Work".to_string(),
            legal_ref: "Labour Standards Act art. 35".to_string(),
            input: serde_json::json!({"work_date": card.work_date}),
            output: serde_json::json!({"holiday_work_minutes": holiday_work_minutes}),
            reasoning: format!("{} is a weekend day", card.work_date.format("%a %Y-%m-%d")),
        });
    }

    Ok(DailyCalculation {
        span: Some(span),
        gross_span,
        total_break,
        work_minutes,
        overtime_minutes,
        late_night_overtime_minutes,
        holiday_work_minutes,
        audit_steps,
        warnings,
    })
}
