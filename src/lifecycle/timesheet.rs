//! Submission status of monthly time-sheets and approval envelopes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{MonthlyApproval, MonthlyTimeSheet, SheetStatus};

/// A request to move a sheet or envelope to another status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetAction {
    /// `editing → submitted`.
    Submit,
    /// `submitted → approved`.
    Approve,
    /// `submitted → rejected`.
    Reject,
    /// `rejected → editing`.
    Reopen,
}

impl fmt::Display for SheetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SheetAction::Submit => "submit",
            SheetAction::Approve => "approve",
            SheetAction::Reject => "reject",
            SheetAction::Reopen => "reopen",
        })
    }
}

/// The status an action leads to from `current`.
pub fn next_status(
    entity: &str,
    current: SheetStatus,
    action: SheetAction,
) -> EngineResult<SheetStatus> {
    let next = match (current, action) {
        (SheetStatus::Editing, SheetAction::Submit) => SheetStatus::Submitted,
        (SheetStatus::Submitted, SheetAction::Approve) => SheetStatus::Approved,
        (SheetStatus::Submitted, SheetAction::Reject) => SheetStatus::Rejected,
        (SheetStatus::Rejected, SheetAction::Reopen) => SheetStatus::Editing,
        _ => {
            return Err(EngineError::StateTransitionForbidden {
                entity: entity.to_string(),
                from: current.to_string(),
                to: action.to_string(),
                reason: format!("cannot {action} a {current} {entity}"),
            });
        }
    };
    Ok(next)
}

/// Applies an action to a monthly time-sheet, stamping actor and time.
pub fn apply_to_sheet(
    sheet: &mut MonthlyTimeSheet,
    action: SheetAction,
    actor: &str,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    sheet.status = next_status("time-sheet", sheet.status, action)?;
    match action {
        SheetAction::Submit => {
            sheet.submitted_at = Some(now);
            sheet.submitted_by = Some(actor.to_string());
            sheet.rejected_at = None;
            sheet.rejection_reason = None;
        }
        SheetAction::Approve => {
            sheet.approved_at = Some(now);
            sheet.approved_by = Some(actor.to_string());
        }
        SheetAction::Reject => {
            sheet.rejected_at = Some(now);
            sheet.rejection_reason = reason.map(str::to_string);
        }
        SheetAction::Reopen => {
            sheet.submitted_at = None;
            sheet.submitted_by = None;
        }
    }
    Ok(())
}

/// Applies an action to an approval envelope.
pub fn apply_to_approval(approval: &mut MonthlyApproval, action: SheetAction) -> EngineResult<()> {
    approval.status = next_status("approval", approval.status, action)?;
    Ok(())
}
