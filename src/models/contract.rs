//! Staff-side and client-side contracts.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::staff::StaffId;

/// Identifier of a staff or client contract.
pub type ContractId = Uuid;

/// Status of a contract in the issuance lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Being drafted; assignments may be created.
    Draft,
    /// Waiting for approval.
    Pending,
    /// Approved, not yet issued.
    Approved,
    /// Contract document issued to the staff member.
    Issued,
    /// Staff member confirmed the issued document.
    Confirmed,
}

impl ContractStatus {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Pending => "pending",
            ContractStatus::Approved => "approved",
            ContractStatus::Issued => "issued",
            ContractStatus::Confirmed => "confirmed",
        }
    }

    /// Whether approval has been granted (approved or any later status).
    pub fn is_approved_or_later(&self) -> bool {
        matches!(
            self,
            ContractStatus::Approved | ContractStatus::Issued | ContractStatus::Confirmed
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit in which pay (staff side) or billing (client side) is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayUnit {
    /// Per hour.
    Hourly,
    /// Per day.
    Daily,
    /// Per month.
    Monthly,
}

/// Kind of client contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    /// Worker dispatch (the client directs the worker).
    Dispatch,
    /// Any other arrangement (outsourcing, introduction, ...).
    Other,
}

/// Whether a dispatch contract restricts itself to indefinite-term or
/// 60-and-over staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitationFlag {
    /// Restricted to indefinite-term or senior staff.
    Limited,
    /// No such restriction.
    NotLimited,
}

/// The staff-side contract binding a staff member to working conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffContract {
    /// Unique identifier.
    pub id: ContractId,
    /// Tenant owning the contract; scopes contract numbering.
    pub tenant_id: String,
    /// The contracted staff member.
    pub staff_id: StaffId,
    /// Contract name shown in listings.
    pub name: String,
    /// Lifecycle status.
    pub status: ContractStatus,
    /// Contract number, allocated when the contract is issued.
    #[serde(default)]
    pub contract_number: Option<String>,
    /// First day of the contract.
    pub start_date: NaiveDate,
    /// Last day of the contract; `None` for open-ended contracts.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Work-time pattern used to pre-fill time-cards.
    #[serde(default)]
    pub worktime_pattern_id: Option<Uuid>,
    /// Calculation policy applied to this contract's time-cards.
    #[serde(default)]
    pub overtime_pattern_id: Option<Uuid>,
    /// Rounding policy applied to punch edges.
    #[serde(default)]
    pub time_punch_id: Option<Uuid>,
    /// Employment type master reference.
    #[serde(default)]
    pub employment_type_id: Option<Uuid>,
    /// Job category master reference.
    #[serde(default)]
    pub job_category_id: Option<Uuid>,
    /// Pay unit.
    #[serde(default)]
    pub pay_unit: Option<PayUnit>,
    /// Pay amount per unit.
    #[serde(default)]
    pub pay_amount: Option<Decimal>,
    /// Free-text work location; a prefecture may be parsed from it.
    #[serde(default)]
    pub work_location: Option<String>,
    /// When approval was granted.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Who granted approval.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the contract was issued.
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    /// Who issued the contract.
    #[serde(default)]
    pub issued_by: Option<String>,
    /// When the staff member confirmed the contract.
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StaffContract {
    /// Creates a draft contract with no optional references set.
    pub fn draft(
        tenant_id: impl Into<String>,
        staff_id: StaffId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            staff_id,
            name: name.into(),
            status: ContractStatus::Draft,
            contract_number: None,
            start_date,
            end_date,
            worktime_pattern_id: None,
            overtime_pattern_id: None,
            time_punch_id: None,
            employment_type_id: None,
            job_category_id: None,
            pay_unit: None,
            pay_amount: None,
            work_location: None,
            approved_at: None,
            approved_by: None,
            issued_at: None,
            issued_by: None,
            confirmed_at: None,
        }
    }

    /// Whether the date lies inside the contract period.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }
}

/// The client-side contract a staff contract is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContract {
    /// Unique identifier.
    pub id: ContractId,
    /// Tenant owning the contract.
    pub tenant_id: String,
    /// Client display name.
    pub client_name: String,
    /// Lifecycle status.
    pub status: ContractStatus,
    /// Dispatch or another arrangement.
    pub contract_type: ContractType,
    /// First day of the contract.
    pub start_date: NaiveDate,
    /// Last day of the contract; `None` for open-ended contracts.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Billing unit.
    #[serde(default)]
    pub bill_unit: Option<PayUnit>,
    /// Billing amount per unit.
    #[serde(default)]
    pub bill_amount: Option<Decimal>,
    /// Job category master reference.
    #[serde(default)]
    pub job_category_id: Option<Uuid>,
    /// Dispatch only: indefinite-or-senior limitation.
    #[serde(default)]
    pub limitation: Option<LimitationFlag>,
}

impl ClientContract {
    /// Contract length in days, both ends inclusive; `None` when open-ended.
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }

    /// Whether this is a dispatch contract.
    pub fn is_dispatch(&self) -> bool {
        self.contract_type == ContractType::Dispatch
    }
}
