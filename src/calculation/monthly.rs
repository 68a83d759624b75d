//! Monthly aggregation.
//!
//! Folds a month's time-cards into [`MonthlyTotals`]. A common first pass
//! sums the daily fields; a per-regime step then derives overtime, variable
//! surplus, monthly premium and deduction. All subtractions saturate at
//! zero, so exact equality with a threshold yields 0.
//!
//! The aggregation is a pure function of the cards and the pattern: the
//! order of the cards does not matter and running it twice yields the same
//! totals.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditWarning, DailyTimeCard, MonthlyTotals, WorkType, YearMonth, format_minutes,
};
use crate::policy::{OvertimePattern, PolicyVariant};

/// Warning code: premium overtime beyond the monthly threshold.
pub const MONTHLY_OVERTIME_CAP_EXCEEDED: &str = "MONTHLY_OVERTIME_CAP_EXCEEDED";

/// Warning code: overtime beyond the fixed estimated overtime.
pub const ESTIMATED_OVERTIME_EXCEEDED: &str = "ESTIMATED_OVERTIME_EXCEEDED";

/// Warning code: an ISO week's regular minutes beyond the weekly threshold.
pub const WEEKLY_THRESHOLD_EXCEEDED: &str = "WEEKLY_THRESHOLD_EXCEEDED";

/// The result of aggregating one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregation {
    /// The recomputed totals.
    pub totals: MonthlyTotals,
    /// The audit steps recording the aggregation.
    pub audit_steps: Vec<AuditStep>,
    /// Conditions worth reviewing; they never alter the totals.
    pub warnings: Vec<AuditWarning>,
}

/// Sums shared by every regime.
#[derive(Debug, Clone, Copy, Default)]
struct CommonPass {
    work_days: u32,
    work_minutes: u32,
    daily_overtime: u32,
    late_night: u32,
    holiday_work: u32,
    absence_days: u32,
}

/// The regime-specific outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RegimeTotals {
    overtime: u32,
    variable: u32,
    premium: u32,
    deduction: u32,
}

/// Aggregates a month's time-cards under a pattern.
///
/// # Arguments
///
/// * `month` - The month being aggregated; selects the legal-hours entry
/// * `cards` - Every time-card of the month, already calculated
/// * `pattern` - The contract's overtime pattern
/// * `start_step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// [`crate::error::EngineError::PolicyMisconfigured`] when the pattern fails
/// validation or, for variable and flextime, has no legal hours for the
/// month's length.
///
/// # Examples
///
/// ```
/// use kintai_engine::calculation::aggregate_month;
/// use kintai_engine::models::YearMonth;
/// use kintai_engine::policy::{OvertimePattern, PolicyVariant};
///
/// let pattern = OvertimePattern::new("Flex", PolicyVariant::Flextime);
/// let april = YearMonth::new(2023, 4).unwrap();
/// let result = aggregate_month(april, &[], &pattern, 1).unwrap();
/// // Nothing worked: the whole legal month is a deduction
/// assert_eq!(result.totals.total_deduction_minutes, 171 * 60 + 25);
/// ```
pub fn aggregate_month(
    month: YearMonth,
    cards: &[DailyTimeCard],
    pattern: &OvertimePattern,
    start_step_number: u32,
) -> EngineResult<MonthlyAggregation> {
    pattern.validate()?;

    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut current_step = start_step_number;

    // Step 1: common first pass
    let common = common_pass(cards);
    let late_night = if pattern.shared.calculate_midnight_premium {
        common.late_night
    } else {
        0
    };
    let paid_leave_days: Decimal = cards
        .iter()
        .filter(|c| c.work_type == WorkType::PaidLeave)
        .map(|c| c.paid_leave_days)
        .sum();

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "monthly_common_pass".to_string(),
        rule_name: "Monthly Sums".to_string(),
        legal_ref: String::new(),
        input: serde_json::json!({
            "month": month.to_string(),
            "cards": cards.len(),
            "calculate_midnight_premium": pattern.shared.calculate_midnight_premium,
        }),
        output: serde_json::json!({
            "total_work_days": common.work_days,
            "total_work_minutes": common.work_minutes,
            "daily_overtime_sum": common.daily_overtime,
            "total_late_night_overtime_minutes": late_night,
            "total_holiday_work_minutes": common.holiday_work,
            "total_absence_days": common.absence_days,
            "total_paid_leave_days": paid_leave_days.normalize().to_string(),
        }),
        reasoning: format!(
            "{} days worked for {} in {month}",
            common.work_days,
            format_minutes(common.work_minutes)
        ),
    });
    current_step += 1;

    // Step 2: regime-specific totals
    let regime = match &pattern.variant {
        PolicyVariant::Premium => {
            premium_totals(&common, pattern, current_step, &mut audit_steps, &mut warnings)
        }
        PolicyVariant::MonthlyRange {
            min_hours,
            max_hours,
        } => monthly_range_totals(&common, *min_hours, *max_hours, current_step, &mut audit_steps),
        PolicyVariant::Variable => {
            let legal = pattern.legal_minutes(month)?;
            variable_totals(&common, legal, pattern, current_step, &mut audit_steps)
        }
        PolicyVariant::Flextime => {
            let legal = pattern.legal_minutes(month)?;
            flextime_totals(&common, legal, pattern, current_step, &mut audit_steps)
        }
    };

    // Reporting-only thresholds
    if let Some(estimated) = pattern.shared.estimated_minutes() {
        if regime.overtime > estimated {
            warnings.push(AuditWarning::new(
                ESTIMATED_OVERTIME_EXCEEDED,
                format!(
                    "overtime {} exceeds the estimated fixed overtime of {}",
                    format_minutes(regime.overtime),
                    format_minutes(estimated)
                ),
                "medium",
            ));
        }
    }
    if let Some(weekly) = pattern.shared.weekly_threshold_minutes() {
        warnings.extend(weekly_warnings(cards, weekly));
    }

    let totals = MonthlyTotals {
        total_work_days: common.work_days,
        total_work_minutes: common.work_minutes,
        total_overtime_minutes: regime.overtime,
        total_late_night_overtime_minutes: late_night,
        total_variable_minutes: regime.variable,
        total_premium_minutes: regime.premium,
        total_deduction_minutes: regime.deduction,
        total_holiday_work_minutes: common.holiday_work,
        total_absence_days: common.absence_days,
        total_paid_leave_days: paid_leave_days,
    };

    Ok(MonthlyAggregation {
        totals,
        audit_steps,
        warnings,
    })
}

fn common_pass(cards: &[DailyTimeCard]) -> CommonPass {
    cards.iter().fold(CommonPass::default(), |mut acc, card| {
        if card.work_minutes > 0 || card.work_type == WorkType::PaidLeave {
            acc.work_days += 1;
        }
        if card.work_type == WorkType::Absent {
            acc.absence_days += 1;
        }
        acc.work_minutes += card.work_minutes;
        acc.daily_overtime += card.overtime_minutes;
        acc.late_night += card.late_night_overtime_minutes;
        acc.holiday_work += card.holiday_work_minutes;
        acc
    })
}

fn premium_totals(
    common: &CommonPass,
    pattern: &OvertimePattern,
    step_number: u32,
    audit_steps: &mut Vec<AuditStep>,
    warnings: &mut Vec<AuditWarning>,
) -> RegimeTotals {
    let overtime = common.daily_overtime;
    let cap = pattern.shared.monthly_threshold_minutes();

    if let Some(cap) = cap {
        if overtime > cap {
            warnings.push(AuditWarning::new(
                MONTHLY_OVERTIME_CAP_EXCEEDED,
                format!(
                    "overtime {} exceeds the monthly threshold of {} by {}",
                    format_minutes(overtime),
                    format_minutes(cap),
                    format_minutes(overtime - cap)
                ),
                "high",
            ));
        }
    }

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "monthly_premium".to_string(),
        rule_name: "Premium Regime".to_string(),
        legal_ref: "Labour Standards Act art. 37(1)".to_string(),
        input: serde_json::json!({
            "daily_overtime_sum": overtime,
            "monthly_threshold": cap,
        }),
        output: serde_json::json!({"total_overtime_minutes": overtime}),
        reasoning: "overtime is the sum of daily overtime; the monthly threshold is reported, not applied"
            .to_string(),
    });

    RegimeTotals {
        overtime,
        ..RegimeTotals::default()
    }
}

fn monthly_range_totals(
    common: &CommonPass,
    min_hours: u32,
    max_hours: u32,
    step_number: u32,
    audit_steps: &mut Vec<AuditStep>,
) -> RegimeTotals {
    let worked = common.work_minutes;
    let (lo, hi) = (min_hours * 60, max_hours * 60);
    let overtime = worked.saturating_sub(hi);
    let deduction = lo.saturating_sub(worked);

    let reasoning = if overtime > 0 {
        format!("{} worked is above the {max_hours}h band edge", format_minutes(worked))
    } else if deduction > 0 {
        format!("{} worked is below the {min_hours}h band edge", format_minutes(worked))
    } else {
        format!("{} worked is inside the {min_hours}-{max_hours}h band", format_minutes(worked))
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "monthly_range".to_string(),
        rule_name: "Monthly Range Regime".to_string(),
        legal_ref: String::new(),
        input: serde_json::json!({
            "total_work_minutes": worked,
            "range_min": lo,
            "range_max": hi,
        }),
        output: serde_json::json!({
            "total_overtime_minutes": overtime,
            "total_deduction_minutes": deduction,
        }),
        reasoning,
    });

    RegimeTotals {
        overtime,
        deduction,
        ..RegimeTotals::default()
    }
}

fn variable_totals(
    common: &CommonPass,
    legal: u32,
    pattern: &OvertimePattern,
    step_number: u32,
    audit_steps: &mut Vec<AuditStep>,
) -> RegimeTotals {
    let overtime = common.daily_overtime;
    let regular = common.work_minutes.saturating_sub(overtime);
    let variable = regular.saturating_sub(legal);
    let threshold = pattern.shared.monthly_threshold_minutes();
    let premium = threshold.map_or(0, |t| (overtime + variable).saturating_sub(t));

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "monthly_variable".to_string(),
        rule_name: "Variable Working Time Regime".to_string(),
        legal_ref: "Labour Standards Act art. 32-2".to_string(),
        input: serde_json::json!({
            "total_work_minutes": common.work_minutes,
            "daily_overtime_sum": overtime,
            "legal_minutes": legal,
            "monthly_threshold": threshold,
        }),
        output: serde_json::json!({
            "total_overtime_minutes": overtime,
            "total_variable_minutes": variable,
            "total_premium_minutes": premium,
        }),
        reasoning: format!(
            "{} of regular time against {} legal hours leaves {} surplus",
            format_minutes(regular),
            format_minutes(legal),
            format_minutes(variable)
        ),
    });

    RegimeTotals {
        overtime,
        variable,
        premium,
        deduction: 0,
    }
}

fn flextime_totals(
    common: &CommonPass,
    legal: u32,
    pattern: &OvertimePattern,
    step_number: u32,
    audit_steps: &mut Vec<AuditStep>,
) -> RegimeTotals {
    let worked = common.work_minutes;
    let overtime = worked.saturating_sub(legal);
    let deduction = legal.saturating_sub(worked);
    let threshold = pattern.shared.monthly_threshold_minutes();
    let premium = threshold.map_or(0, |t| overtime.saturating_sub(t));

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "monthly_flextime".to_string(),
        rule_name: "Flextime Regime".to_string(),
        legal_ref: "Labour Standards Act art. 32-3".to_string(),
        input: serde_json::json!({
            "total_work_minutes": worked,
            "legal_minutes": legal,
            "monthly_threshold": threshold,
        }),
        output: serde_json::json!({
            "total_overtime_minutes": overtime,
            "total_deduction_minutes": deduction,
            "total_premium_minutes": premium,
        }),
        reasoning: format!(
            "{} worked against {} legal hours for the settlement period",
            format_minutes(worked),
            format_minutes(legal)
        ),
    });

    RegimeTotals {
        overtime,
        variable: 0,
        premium,
        deduction,
    }
}

/// One warning per ISO week whose regular minutes exceed the threshold.
fn weekly_warnings(cards: &[DailyTimeCard], threshold: u32) -> Vec<AuditWarning> {
    let mut weeks: BTreeMap<(i32, u32), u32> = BTreeMap::new();
    for card in cards {
        let week = card.work_date.iso_week();
        *weeks.entry((week.year(), week.week())).or_default() +=
            card.work_minutes.saturating_sub(card.overtime_minutes);
    }

    weeks
        .into_iter()
        .filter(|(_, minutes)| *minutes > threshold)
        .map(|((year, week), minutes)| {
            AuditWarning::new(
                WEEKLY_THRESHOLD_EXCEEDED,
                format!(
                    "week {year}-W{week:02} has {} of regular time, above {}",
                    format_minutes(minutes),
                    format_minutes(threshold)
                ),
                "medium",
            )
        })
        .collect()
}
