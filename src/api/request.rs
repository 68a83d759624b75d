//! Request types for the time & attendance API.
//!
//! Bodies that map onto a stored record leave out the identifiers the
//! engine assigns itself.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ContractId, ContractStatus, DailyTimeCard, StaffId, TimeOfDay, WorkType};

/// Request body for `POST /timecards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCardRequest {
    /// Staff contract the card belongs to.
    pub contract_id: ContractId,
    /// Work date.
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
    /// Break minutes inside the late-night window.
    #[serde(default)]
    pub late_night_break_minutes: u32,
    /// Paid-leave days.
    #[serde(default)]
    pub paid_leave_days: Decimal,
    /// Free-text memo.
    #[serde(default)]
    pub memo: Option<String>,
}

impl From<TimeCardRequest> for DailyTimeCard {
    fn from(req: TimeCardRequest) -> Self {
        // The engine files the card under the right month sheet.
        let mut card = DailyTimeCard::new(Uuid::nil(), req.contract_id, req.work_date, req.work_type);
        card.start = req.start;
        card.end = req.end;
        card.break_minutes = req.break_minutes;
        card.late_night_break_minutes = req.late_night_break_minutes;
        card.paid_leave_days = req.paid_leave_days;
        card.memo = req.memo;
        card
    }
}

/// Request body for `POST /timecards/prefill`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefillRequest {
    /// Staff contract whose work-time pattern is used.
    pub contract_id: ContractId,
    /// Work date.
    pub work_date: NaiveDate,
    /// Name of the slot to copy.
    pub slot: String,
}

/// Request body for actions that only record who performed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    /// The acting user.
    pub actor: String,
    /// Why, for rejections.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Path segment of `POST /staff-contracts/:id/:action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAction {
    /// `draft → pending`.
    RequestApproval,
    /// `pending → approved`.
    Approve,
    /// `approved → issued`, allocating a contract number.
    Issue,
    /// `issued → approved`.
    Unissue,
    /// Back to `draft` from any approved state.
    RevokeApproval,
    /// `issued → confirmed`.
    Confirm,
}

/// Request body for `POST /approvals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Staff member submitting.
    pub staff_id: StaffId,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Payroll closing date.
    pub closing_date: NaiveDate,
}

/// Request body for assignment validation and creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    /// Client contract.
    pub client_contract_id: ContractId,
    /// Staff contract.
    pub staff_contract_id: ContractId,
}

/// Request body for `POST /client-contracts/:id/transition-check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionCheckRequest {
    /// The status the client contract is moving to.
    pub target: ContractStatus,
}

/// Query of `GET /staff/:id/conflict-date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictDateQuery {
    /// Client organisation name.
    pub client_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_card_request_defaults() {
        let json = format!(
            r#"{{"contract_id":"{}","work_date":"2023-04-03","work_type":"holiday"}}"#,
            Uuid::new_v4()
        );
        let req: TimeCardRequest = serde_json::from_str(&json).unwrap();
        assert!(req.start.is_none());
        assert_eq!(req.break_minutes, 0);
        assert_eq!(req.paid_leave_days, Decimal::ZERO);
    }

    #[test]
    fn test_time_card_request_into_card() {
        let contract_id = Uuid::new_v4();
        let req = TimeCardRequest {
            contract_id,
            work_date: NaiveDate::from_ymd_opt(2023, 4, 3).unwrap(),
            work_type: WorkType::Work,
            start: Some(TimeOfDay::hm(9, 0).unwrap()),
            end: Some(TimeOfDay::hm(18, 0).unwrap()),
            break_minutes: 60,
            late_night_break_minutes: 0,
            paid_leave_days: Decimal::ZERO,
            memo: Some("site visit".to_string()),
        };
        let card: DailyTimeCard = req.into();
        assert_eq!(card.contract_id, contract_id);
        assert_eq!(card.break_minutes, 60);
        assert_eq!(card.work_minutes, 0);
        assert_eq!(card.memo.as_deref(), Some("site visit"));
    }

    #[test]
    fn test_actor_request_reason_optional() {
        let req: ActorRequest = serde_json::from_str(r#"{"actor":"manager"}"#).unwrap();
        assert!(req.reason.is_none());
    }
}
