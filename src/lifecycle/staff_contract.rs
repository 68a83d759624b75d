//! Staff-contract issuance state machine.
//!
//! ```text
//! draft → pending → approved → issued → confirmed
//!                      ↑          │
//!                      └──────────┘  un-issue
//! approved | issued | confirmed → draft  (revoke approval)
//! ```
//!
//! Every function checks the source state before touching anything, so a
//! rejected transition leaves the contract and its assignments unchanged.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{Assignment, ContractStatus, StaffContract};

fn forbidden(contract: &StaffContract, to: ContractStatus, reason: &str) -> EngineError {
    EngineError::StateTransitionForbidden {
        entity: "staff contract".to_string(),
        from: contract.status.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

fn require(
    contract: &StaffContract,
    allowed: &[ContractStatus],
    to: ContractStatus,
    reason: &str,
) -> EngineResult<()> {
    if allowed.contains(&contract.status) {
        Ok(())
    } else {
        Err(forbidden(contract, to, reason))
    }
}

/// `draft → pending`.
pub fn request_approval(contract: &mut StaffContract) -> EngineResult<()> {
    require(
        contract,
        &[ContractStatus::Draft],
        ContractStatus::Pending,
        "only draft contracts can be submitted for approval",
    )?;
    contract.status = ContractStatus::Pending;
    Ok(())
}

/// `pending → approved`, stamping who approved it.
pub fn approve(contract: &mut StaffContract, actor: &str, now: DateTime<Utc>) -> EngineResult<()> {
    require(
        contract,
        &[ContractStatus::Pending],
        ContractStatus::Approved,
        "only pending contracts can be approved",
    )?;
    contract.status = ContractStatus::Approved;
    contract.approved_at = Some(now);
    contract.approved_by = Some(actor.to_string());
    Ok(())
}

/// `approved → issued` with a freshly allocated contract number.
///
/// Clears the staff confirmation on every assignment of the contract.
pub fn issue(
    contract: &mut StaffContract,
    assignments: &mut [Assignment],
    contract_number: String,
    actor: &str,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    require(
        contract,
        &[ContractStatus::Approved],
        ContractStatus::Issued,
        "only approved contracts can be issued",
    )?;
    if contract_number.trim().is_empty() {
        return Err(forbidden(
            contract,
            ContractStatus::Issued,
            "a contract number is required to issue",
        ));
    }
    contract.status = ContractStatus::Issued;
    contract.contract_number = Some(contract_number);
    contract.issued_at = Some(now);
    contract.issued_by = Some(actor.to_string());
    for assignment in assignments.iter_mut() {
        assignment.clear_confirmation();
    }
    Ok(())
}

/// `issued → confirmed`.
pub fn confirm(contract: &mut StaffContract, now: DateTime<Utc>) -> EngineResult<()> {
    require(
        contract,
        &[ContractStatus::Issued],
        ContractStatus::Confirmed,
        "only issued contracts can be confirmed",
    )?;
    contract.status = ContractStatus::Confirmed;
    contract.confirmed_at = Some(now);
    Ok(())
}

/// `issued → approved`.
///
/// Nulls the contract's issuance stamps and both employment-conditions
/// stamps on every assignment. The contract number and print history stay.
pub fn unissue(contract: &mut StaffContract, assignments: &mut [Assignment]) -> EngineResult<()> {
    require(
        contract,
        &[ContractStatus::Issued],
        ContractStatus::Approved,
        "only issued contracts can be un-issued",
    )?;
    contract.status = ContractStatus::Approved;
    contract.issued_at = None;
    contract.issued_by = None;
    for assignment in assignments.iter_mut() {
        assignment.reset_issuance();
    }
    Ok(())
}

/// `approved | issued | confirmed → draft`.
///
/// Performs the un-issue cascade and also nulls approval, the contract
/// number and the contract's own confirmation.
pub fn revoke_approval(
    contract: &mut StaffContract,
    assignments: &mut [Assignment],
) -> EngineResult<()> {
    require(
        contract,
        &[
            ContractStatus::Approved,
            ContractStatus::Issued,
            ContractStatus::Confirmed,
        ],
        ContractStatus::Draft,
        "only approved or later contracts can have approval revoked",
    )?;
    contract.status = ContractStatus::Draft;
    contract.approved_at = None;
    contract.approved_by = None;
    contract.contract_number = None;
    contract.issued_at = None;
    contract.issued_by = None;
    contract.confirmed_at = None;
    for assignment in assignments.iter_mut() {
        assignment.reset_issuance();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn contract() -> StaffContract {
        StaffContract::draft(
            "t1",
            Uuid::new_v4(),
            "Packing",
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            None,
        )
    }

    fn issued_with(assignments: &mut [Assignment]) -> StaffContract {
        let mut c = contract();
        request_approval(&mut c).unwrap();
        approve(&mut c, "manager", Utc::now()).unwrap();
        issue(&mut c, assignments, "T1-000001".to_string(), "clerk", Utc::now()).unwrap();
        c
    }

    fn stamped(contract_id: Uuid) -> Assignment {
        let mut a = Assignment::new(Uuid::new_v4(), contract_id);
        a.issued_at = Some(Utc::now());
        a.issued_by = Some("clerk".to_string());
        a.confirmed_at = Some(Utc::now());
        a
    }

    #[test]
    fn test_happy_path_to_confirmed() {
        let mut c = issued_with(&mut []);
        assert_eq!(c.status, ContractStatus::Issued);
        assert_eq!(c.contract_number.as_deref(), Some("T1-000001"));
        confirm(&mut c, Utc::now()).unwrap();
        assert_eq!(c.status, ContractStatus::Confirmed);
        assert!(c.confirmed_at.is_some());
    }

    #[test]
    fn test_issue_from_draft_forbidden_and_unchanged() {
        let mut c = contract();
        let before = c.clone();
        let error = issue(&mut c, &mut [], "T1-000001".to_string(), "clerk", Utc::now()).unwrap_err();
        assert!(matches!(error, EngineError::StateTransitionForbidden { .. }));
        assert_eq!(c, before);
    }

    #[test]
    fn test_issue_clears_assignment_confirmation() {
        let mut assignments = vec![stamped(Uuid::new_v4())];
        issued_with(&mut assignments);
        assert!(assignments[0].confirmed_at.is_none());
        assert!(assignments[0].issued_at.is_some());
    }

    #[test]
    fn test_unissue_cascades_to_assignments() {
        let mut assignments = Vec::new();
        let mut c = issued_with(&mut assignments);
        let mut assignments = vec![stamped(c.id), stamped(c.id)];
        unissue(&mut c, &mut assignments).unwrap();
        assert_eq!(c.status, ContractStatus::Approved);
        assert!(c.issued_at.is_none());
        assert_eq!(c.contract_number.as_deref(), Some("T1-000001"));
        assert!(assignments.iter().all(|a| a.issued_at.is_none() && a.confirmed_at.is_none()));
    }

    #[test]
    fn test_unissue_only_from_issued() {
        let mut c = issued_with(&mut []);
        confirm(&mut c, Utc::now()).unwrap();
        assert!(unissue(&mut c, &mut []).is_err());
    }

    #[test]
    fn test_revoke_nulls_number_and_approval() {
        let mut c = issued_with(&mut []);
        confirm(&mut c, Utc::now()).unwrap();
        let mut assignments = vec![stamped(c.id)];
        revoke_approval(&mut c, &mut assignments).unwrap();
        assert_eq!(c.status, ContractStatus::Draft);
        assert!(c.contract_number.is_none());
        assert!(c.approved_at.is_none());
        assert!(c.confirmed_at.is_none());
        assert!(assignments[0].issued_at.is_none());
    }

    #[test]
    fn test_revoke_from_pending_forbidden() {
        let mut c = contract();
        request_approval(&mut c).unwrap();
        assert!(revoke_approval(&mut c, &mut []).is_err());
        assert_eq!(c.status, ContractStatus::Pending);
    }

    #[test]
    fn test_blank_number_rejected() {
        let mut c = contract();
        request_approval(&mut c).unwrap();
        approve(&mut c, "manager", Utc::now()).unwrap();
        assert!(issue(&mut c, &mut [], " ".to_string(), "clerk", Utc::now()).is_err());
        assert_eq!(c.status, ContractStatus::Approved);
    }
}
