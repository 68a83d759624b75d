//! Daily time-cards, monthly time-sheets and submission envelopes.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clock::{TimeOfDay, YearMonth};
use super::contract::ContractId;
use super::staff::StaffId;

/// Identifier of a monthly time-sheet.
pub type MonthId = Uuid;

/// Identifier of a daily time-card.
pub type DailyId = Uuid;

/// Kind of day recorded on a time-card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Worked; start and end are required.
    Work,
    /// Scheduled day off.
    Holiday,
    /// Absent from a scheduled working day.
    Absent,
    /// Paid leave; counts as a work day but contributes no minutes.
    PaidLeave,
    /// Special leave.
    SpecialLeave,
    /// Compensatory day off.
    CompensatoryLeave,
    /// No work scheduled.
    NoWork,
}

/// One day's record on a monthly time-sheet.
///
/// The input fields are written by the caller; the derived fields
/// (`work_minutes` onwards) are written only by the daily calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTimeCard {
    /// Unique identifier.
    pub id: DailyId,
    /// Owning monthly time-sheet.
    pub month_id: MonthId,
    /// Staff contract the card belongs to.
    pub contract_id: ContractId,
    /// Calendar date of the card.
    pub work_date: NaiveDate,
    /// Kind of day.
    pub work_type: WorkType,
    /// Punch-in.
    #[serde(default)]
    pub start: Option<TimeOfDay>,
    /// Punch-out.
    #[serde(default)]
    pub end: Option<TimeOfDay>,
    /// Normal break minutes.
    #[serde(default)]
    pub break_minutes: u32,
    /// Break minutes taken inside the late-night window.
    #[serde(default)]
    pub late_night_break_minutes: u32,
    /// Paid-leave days (0.5 for a half day).
    #[serde(default)]
    pub paid_leave_days: Decimal,
    /// Free-text memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// Derived: worked minutes.
    #[serde(default)]
    pub work_minutes: u32,
    /// Derived: daily overtime minutes.
    #[serde(default)]
    pub overtime_minutes: u32,
    /// Derived: late-night minutes.
    #[serde(default)]
    pub late_night_overtime_minutes: u32,
    /// Derived: minutes worked on a weekend day.
    #[serde(default)]
    pub holiday_work_minutes: u32,
}

impl DailyTimeCard {
    /// Creates a card with no times and zeroed derived fields.
    pub fn new(
        month_id: MonthId,
        contract_id: ContractId,
        work_date: NaiveDate,
        work_type: WorkType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            month_id,
            contract_id,
            work_date,
            work_type,
            start: None,
            end: None,
            break_minutes: 0,
            late_night_break_minutes: 0,
            paid_leave_days: Decimal::ZERO,
            memo: None,
            work_minutes: 0,
            overtime_minutes: 0,
            late_night_overtime_minutes: 0,
            holiday_work_minutes: 0,
        }
    }

    /// Sets punch-in and punch-out.
    pub fn with_times(mut self, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Sets normal and late-night break minutes.
    pub fn with_breaks(mut self, break_minutes: u32, late_night_break_minutes: u32) -> Self {
        self.break_minutes = break_minutes;
        self.late_night_break_minutes = late_night_break_minutes;
        self
    }

    /// Whether the card's date is a Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.work_date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Copies the caller-owned input fields from another card.
    pub fn copy_inputs_from(&mut self, other: &DailyTimeCard) {
        self.work_type = other.work_type;
        self.start = other.start;
        self.end = other.end;
        self.break_minutes = other.break_minutes;
        self.late_night_break_minutes = other.late_night_break_minutes;
        self.paid_leave_days = other.paid_leave_days;
        self.memo = other.memo.clone();
    }
}

/// Status of a monthly time-sheet or of a submission envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    /// Open for edits.
    Editing,
    /// Submitted for approval.
    Submitted,
    /// Approved.
    Approved,
    /// Sent back to the submitter.
    Rejected,
}

impl fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SheetStatus::Editing => "editing",
            SheetStatus::Submitted => "submitted",
            SheetStatus::Approved => "approved",
            SheetStatus::Rejected => "rejected",
        })
    }
}

/// Aggregated month totals written by the monthly aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Days with worked minutes or paid leave.
    pub total_work_days: u32,
    /// Σ worked minutes.
    pub total_work_minutes: u32,
    /// Overtime minutes under the month's calculation regime.
    pub total_overtime_minutes: u32,
    /// Late-night minutes (only when the policy pays a late-night premium).
    pub total_late_night_overtime_minutes: u32,
    /// Variable-working-time surplus beyond the legal monthly hours.
    pub total_variable_minutes: u32,
    /// Minutes beyond the monthly premium threshold.
    pub total_premium_minutes: u32,
    /// Minutes short of the monthly floor.
    pub total_deduction_minutes: u32,
    /// Minutes worked on weekend days.
    pub total_holiday_work_minutes: u32,
    /// Days recorded as absent.
    pub total_absence_days: u32,
    /// Σ paid-leave days.
    pub total_paid_leave_days: Decimal,
}

/// A staff contract's time-sheet for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTimeSheet {
    /// Unique identifier.
    pub id: MonthId,
    /// Staff contract.
    pub contract_id: ContractId,
    /// Staff member.
    pub staff_id: StaffId,
    /// The month covered.
    pub year_month: YearMonth,
    /// Aggregated totals.
    pub totals: MonthlyTotals,
    /// Submission status.
    pub status: SheetStatus,
    /// When it was submitted.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who submitted it.
    #[serde(default)]
    pub submitted_by: Option<String>,
    /// When it was approved.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Who approved it.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When it was rejected.
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    /// Why it was rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Set when the last recompute failed; totals are then the last good ones.
    #[serde(default)]
    pub last_recompute_error: Option<String>,
}

impl MonthlyTimeSheet {
    /// A new, empty sheet open for editing.
    pub fn open(contract_id: ContractId, staff_id: StaffId, year_month: YearMonth) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            staff_id,
            year_month,
            totals: MonthlyTotals::default(),
            status: SheetStatus::Editing,
            submitted_at: None,
            submitted_by: None,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejection_reason: None,
            last_recompute_error: None,
        }
    }

    /// Whether time-cards of this month may be written.
    pub fn is_editable(&self) -> bool {
        self.status == SheetStatus::Editing
    }
}

/// A submission envelope covering a closing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyApproval {
    /// Unique identifier.
    pub id: Uuid,
    /// Staff member whose records are enclosed.
    pub staff_id: StaffId,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Closing date of the period.
    pub closing_date: NaiveDate,
    /// Submission status.
    pub status: SheetStatus,
}

impl MonthlyApproval {
    /// Whether the envelope covers the date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.period_start <= date && date <= self.period_end
    }

    /// Whether the envelope freezes the records it covers.
    pub fn is_locking(&self) -> bool {
        matches!(self.status, SheetStatus::Submitted | SheetStatus::Approved)
    }
}

/// A break interval punched on a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchedBreak {
    /// Break start instant.
    pub start: DateTime<Utc>,
    /// Break end instant.
    pub end: DateTime<Utc>,
}

/// Raw clock punches for one work date, before rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRecord {
    /// Staff contract the punches belong to.
    pub contract_id: ContractId,
    /// Work date the punches are booked on.
    pub work_date: NaiveDate,
    /// Clock-in instant.
    pub clock_in: DateTime<Utc>,
    /// Clock-out instant.
    pub clock_out: DateTime<Utc>,
    /// Break punches.
    #[serde(default)]
    pub breaks: Vec<PunchedBreak>,
}
