//! Employment-conditions document issuance and confirmation on an assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Assignment, ContractStatus, PrintHistoryRecord, StaffContract};

/// The outcome of an issuance call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuance {
    /// The print-history row for the current contract number.
    pub record: PrintHistoryRecord,
    /// Whether the row was appended by this call.
    pub newly_created: bool,
}

fn forbidden(to: &str, from: &str, reason: impl Into<String>) -> EngineError {
    EngineError::StateTransitionForbidden {
        entity: "employment conditions".to_string(),
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.into(),
    }
}

fn state_of(assignment: &Assignment) -> &'static str {
    match (assignment.issued_at, assignment.confirmed_at) {
        (_, Some(_)) => "confirmed",
        (Some(_), None) => "issued",
        (None, None) => "not issued",
    }
}

fn current_number(contract: &StaffContract) -> Option<&str> {
    matches!(
        contract.status,
        ContractStatus::Issued | ContractStatus::Confirmed
    )
    .then_some(contract.contract_number.as_deref())
    .flatten()
}

/// Issues the document for the contract's current number.
///
/// At most one print-history row exists per `(assignment, contract_number)`:
/// a repeat call returns the existing row. Every call re-stamps `issued_at`
/// and clears any staff confirmation.
pub fn issue(
    assignment: &mut Assignment,
    contract: &StaffContract,
    history: &[PrintHistoryRecord],
    actor: &str,
    now: DateTime<Utc>,
) -> EngineResult<Issuance> {
    let Some(number) = current_number(contract) else {
        return Err(forbidden(
            "issued",
            state_of(assignment),
            format!(
                "staff contract is {} without a contract number; issue the contract first",
                contract.status
            ),
        ));
    };

    let existing = history
        .iter()
        .find(|r| r.assignment_id == assignment.id && r.contract_number == number);

    let issuance = match existing {
        Some(record) => Issuance {
            record: record.clone(),
            newly_created: false,
        },
        None => Issuance {
            record: PrintHistoryRecord {
                id: Uuid::new_v4(),
                assignment_id: assignment.id,
                contract_number: number.to_string(),
                printed_at: now,
                printed_by: actor.to_string(),
            },
            newly_created: true,
        },
    };

    assignment.issued_at = Some(now);
    assignment.issued_by = Some(actor.to_string());
    assignment.clear_confirmation();

    Ok(issuance)
}

/// Records the staff member's acknowledgement.
///
/// Valid only while the assignment is issued and a print-history row exists
/// for the contract's current number.
pub fn confirm(
    assignment: &mut Assignment,
    contract: &StaffContract,
    history: &[PrintHistoryRecord],
    actor: &str,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if assignment.issued_at.is_none() {
        return Err(forbidden(
            "confirmed",
            state_of(assignment),
            "the employment conditions have not been issued",
        ));
    }
    let printed = current_number(contract).is_some_and(|number| {
        history
            .iter()
            .any(|r| r.assignment_id == assignment.id && r.contract_number == number)
    });
    if !printed {
        return Err(forbidden(
            "confirmed",
            state_of(assignment),
            "no document was issued for the current contract number",
        ));
    }
    assignment.confirmed_at = Some(now);
    assignment.confirmed_by = Some(actor.to_string());
    Ok(())
}
