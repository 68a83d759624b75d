//! Assignments pairing a client contract with a staff contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contract::{ClientContract, ContractId, StaffContract};

/// Identifier of an assignment.
pub type AssignmentId = Uuid;

/// Binds one client contract to one staff contract.
///
/// `issued_at` records the employment-conditions document being issued;
/// `confirmed_at` records the staff member acknowledging it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier.
    pub id: AssignmentId,
    /// The client-side contract.
    pub client_contract_id: ContractId,
    /// The staff-side contract.
    pub staff_contract_id: ContractId,
    /// When the employment-conditions document was issued.
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    /// Who issued it.
    #[serde(default)]
    pub issued_by: Option<String>,
    /// When the staff member confirmed it.
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Who confirmed it.
    #[serde(default)]
    pub confirmed_by: Option<String>,
}

impl Assignment {
    /// A fresh assignment with no issuance state.
    pub fn new(client_contract_id: ContractId, staff_contract_id: ContractId) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_contract_id,
            staff_contract_id,
            issued_at: None,
            issued_by: None,
            confirmed_at: None,
            confirmed_by: None,
        }
    }

    /// Clears both issuance and confirmation of the employment conditions.
    pub fn reset_issuance(&mut self) {
        self.issued_at = None;
        self.issued_by = None;
        self.clear_confirmation();
    }

    /// Clears the confirmation only.
    pub fn clear_confirmation(&mut self) {
        self.confirmed_at = None;
        self.confirmed_by = None;
    }
}

/// One issued employment-conditions document, kept even after un-issuing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintHistoryRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The assignment the document was issued for.
    pub assignment_id: AssignmentId,
    /// Staff-contract number current at issuance.
    pub contract_number: String,
    /// When it was issued.
    pub printed_at: DateTime<Utc>,
    /// Who issued it.
    pub printed_by: String,
}

/// The period during which both contracts of an assignment are in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPeriod {
    /// Later of the two start dates.
    pub start: NaiveDate,
    /// Earlier of the two end dates; `None` when both are open-ended.
    pub end: Option<NaiveDate>,
}

impl AssignmentPeriod {
    /// Intersects the periods of the two contracts.
    pub fn of(client: &ClientContract, staff: &StaffContract) -> Self {
        let end = match (client.end_date, staff.end_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            start: client.start_date.max(staff.start_date),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractStatus, ContractType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client(start: NaiveDate, end: Option<NaiveDate>) -> ClientContract {
        ClientContract {
            id: Uuid::new_v4(),
            tenant_id: "t1".to_string(),
            client_name: "Acme".to_string(),
            status: ContractStatus::Draft,
            contract_type: ContractType::Dispatch,
            start_date: start,
            end_date: end,
            bill_unit: None,
            bill_amount: None,
            job_category_id: None,
            limitation: None,
        }
    }

    #[test]
    fn test_period_takes_later_start_and_earlier_end() {
        let c = client(date(2023, 4, 1), Some(date(2023, 9, 30)));
        let s = StaffContract::draft("t1", Uuid::new_v4(), "x", date(2023, 5, 1), None);
        let period = AssignmentPeriod::of(&c, &s);
        assert_eq!(period.start, date(2023, 5, 1));
        assert_eq!(period.end, Some(date(2023, 9, 30)));
    }

    #[test]
    fn test_period_open_ended_when_both_open() {
        let c = client(date(2023, 4, 1), None);
        let s = StaffContract::draft("t1", Uuid::new_v4(), "x", date(2023, 4, 1), None);
        assert_eq!(AssignmentPeriod::of(&c, &s).end, None);
    }

    #[test]
    fn test_reset_issuance_clears_everything() {
        let mut assignment = Assignment::new(Uuid::new_v4(), Uuid::new_v4());
        assignment.issued_at = Some(Utc::now());
        assignment.issued_by = Some("clerk".to_string());
        assignment.confirmed_at = Some(Utc::now());
        assignment.reset_issuance();
        assert!(assignment.issued_at.is_none());
        assert!(assignment.confirmed_at.is_none());
        assert!(assignment.issued_by.is_none());
    }
}
