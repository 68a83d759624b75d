//! The storage port.
//!
//! The engine never holds references into storage: every operation opens a
//! transaction with [`Repository::begin`], loads the records it needs, writes
//! its changes back and calls [`Store::commit`]. A transaction dropped
//! without a commit is rolled back.

mod memory;

pub use memory::{InMemoryRepository, MemoryTx};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    Assignment, AssignmentId, ClientContract, ContractId, DailyId, DailyTimeCard, EmploymentType,
    JobCategory, MonthId, MonthlyApproval, MonthlyTimeSheet, PrintHistoryRecord, Staff,
    StaffContract, StaffId, StaffPayroll, WorkTimePattern, YearMonth,
};
use crate::policy::{OvertimePattern, TimePunch};

/// A source of transactions.
pub trait Repository: Send + Sync {
    /// The transaction type handed out by [`Repository::begin`].
    type Tx<'a>: Store
    where
        Self: 'a;

    /// Opens a transaction.
    fn begin(&self) -> EngineResult<Self::Tx<'_>>;
}

/// One storage transaction.
///
/// `get_*` lookups fail with [`crate::error::EngineError::NotFound`];
/// `find_*` lookups return `None` instead. Lists are unordered unless noted.
pub trait Store {
    /// A staff member.
    fn get_staff(&self, id: StaffId) -> EngineResult<Staff>;
    /// A staff member's insurance records, if any were entered.
    fn find_payroll(&self, staff_id: StaffId) -> EngineResult<Option<StaffPayroll>>;
    /// An employment-type master row.
    fn get_employment_type(&self, id: Uuid) -> EngineResult<EmploymentType>;
    /// A job-category master row.
    fn get_job_category(&self, id: Uuid) -> EngineResult<JobCategory>;
    /// An overtime pattern.
    fn get_policy(&self, id: Uuid) -> EngineResult<OvertimePattern>;
    /// A time-punch rounding policy.
    fn get_time_punch(&self, id: Uuid) -> EngineResult<TimePunch>;
    /// A work-time pattern.
    fn get_worktime_pattern(&self, id: Uuid) -> EngineResult<WorkTimePattern>;
    /// The hourly minimum wage in force for a prefecture on a date.
    fn get_legal_minimum_wage(
        &self,
        prefecture: &str,
        on_date: NaiveDate,
    ) -> EngineResult<Option<Decimal>>;

    /// A staff-side contract.
    fn get_staff_contract(&self, id: ContractId) -> EngineResult<StaffContract>;
    /// Every staff-side contract of one staff member.
    fn list_staff_contracts(&self, staff_id: StaffId) -> EngineResult<Vec<StaffContract>>;
    /// Inserts or replaces a staff-side contract.
    fn save_staff_contract(&mut self, contract: &StaffContract) -> EngineResult<()>;
    /// Deletes a staff-side contract.
    fn delete_staff_contract(&mut self, id: ContractId) -> EngineResult<()>;
    /// A client-side contract.
    fn get_client_contract(&self, id: ContractId) -> EngineResult<ClientContract>;
    /// Inserts or replaces a client-side contract.
    fn save_client_contract(&mut self, contract: &ClientContract) -> EngineResult<()>;
    /// Deletes a client-side contract.
    fn delete_client_contract(&mut self, id: ContractId) -> EngineResult<()>;
    /// Allocates the next contract number for a tenant, formatted with `prefix`.
    fn allocate_contract_number(&mut self, tenant_id: &str, prefix: &str) -> EngineResult<String>;

    /// An assignment.
    fn get_assignment(&self, id: AssignmentId) -> EngineResult<Assignment>;
    /// The assignment joining two contracts, if one exists.
    fn find_assignment(
        &self,
        client_contract_id: ContractId,
        staff_contract_id: ContractId,
    ) -> EngineResult<Option<Assignment>>;
    /// Assignments of a staff-side contract.
    fn list_assignments_for_staff_contract(&self, id: ContractId) -> EngineResult<Vec<Assignment>>;
    /// Assignments of a client-side contract.
    fn list_assignments_for_client_contract(&self, id: ContractId)
    -> EngineResult<Vec<Assignment>>;
    /// Inserts or replaces an assignment.
    fn save_assignment(&mut self, assignment: &Assignment) -> EngineResult<()>;
    /// Deletes an assignment. Its print history is kept.
    fn delete_assignment(&mut self, id: AssignmentId) -> EngineResult<()>;
    /// Print history of an assignment, oldest first.
    fn list_print_history(&self, assignment_id: AssignmentId)
    -> EngineResult<Vec<PrintHistoryRecord>>;
    /// Appends a print-history row.
    fn append_print_history(&mut self, record: &PrintHistoryRecord) -> EngineResult<()>;

    /// A monthly time-sheet by id.
    fn get_month_by_id(&self, id: MonthId) -> EngineResult<MonthlyTimeSheet>;
    /// The monthly time-sheet of a contract for a year-month, if opened.
    fn find_month(
        &self,
        contract_id: ContractId,
        year_month: YearMonth,
    ) -> EngineResult<Option<MonthlyTimeSheet>>;
    /// Every monthly time-sheet of a contract.
    fn list_months(&self, contract_id: ContractId) -> EngineResult<Vec<MonthlyTimeSheet>>;
    /// Inserts or replaces a monthly time-sheet.
    fn save_month(&mut self, month: &MonthlyTimeSheet) -> EngineResult<()>;
    /// Deletes a monthly time-sheet.
    fn delete_month(&mut self, id: MonthId) -> EngineResult<()>;

    /// Daily cards of a month, ordered by work date.
    fn list_daily(&self, month_id: MonthId) -> EngineResult<Vec<DailyTimeCard>>;
    /// A daily card by id.
    fn get_daily(&self, id: DailyId) -> EngineResult<DailyTimeCard>;
    /// The card of a month for a date, if one was entered.
    fn find_daily(&self, month_id: MonthId, work_date: NaiveDate)
    -> EngineResult<Option<DailyTimeCard>>;
    /// Inserts or replaces a daily card.
    fn save_daily(&mut self, card: &DailyTimeCard) -> EngineResult<()>;
    /// Deletes a daily card.
    fn delete_daily(&mut self, id: DailyId) -> EngineResult<()>;

    /// Approval envelopes of a staff member.
    fn list_approvals(&self, staff_id: StaffId) -> EngineResult<Vec<MonthlyApproval>>;
    /// An approval envelope.
    fn get_approval(&self, id: Uuid) -> EngineResult<MonthlyApproval>;
    /// Inserts or replaces an approval envelope.
    fn save_approval(&mut self, approval: &MonthlyApproval) -> EngineResult<()>;

    /// Makes every write of this transaction visible.
    fn commit(self) -> EngineResult<()>
    where
        Self: Sized;
}
