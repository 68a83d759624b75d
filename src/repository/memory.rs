//! In-memory repository used by the HTTP service and the tests.
//!
//! Committed state lives behind one `RwLock`. A transaction keeps its writes
//! in per-table overlays and reads through them, so it sees its own changes
//! while other transactions only see committed rows. Commit applies the
//! overlays under the write lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Repository, Store};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, AssignmentId, ClientContract, ContractId, DailyId, DailyTimeCard, EmploymentType,
    JobCategory, MonthId, MonthlyApproval, MonthlyTimeSheet, PrintHistoryRecord, Staff,
    StaffContract, StaffId, StaffPayroll, WorkTimePattern, YearMonth,
};
use crate::policy::{OvertimePattern, TimePunch};
use crate::validation::MinimumWageTable;

#[derive(Debug, Default)]
struct Tables {
    staff: HashMap<StaffId, Staff>,
    payroll: HashMap<StaffId, StaffPayroll>,
    employment_types: HashMap<Uuid, EmploymentType>,
    job_categories: HashMap<Uuid, JobCategory>,
    policies: HashMap<Uuid, OvertimePattern>,
    time_punches: HashMap<Uuid, TimePunch>,
    worktime_patterns: HashMap<Uuid, WorkTimePattern>,
    minimum_wages: MinimumWageTable,
    contract_sequences: HashMap<String, u64>,
    staff_contracts: HashMap<ContractId, StaffContract>,
    client_contracts: HashMap<ContractId, ClientContract>,
    assignments: HashMap<AssignmentId, Assignment>,
    print_history: HashMap<Uuid, PrintHistoryRecord>,
    months: HashMap<MonthId, MonthlyTimeSheet>,
    dailies: HashMap<DailyId, DailyTimeCard>,
    approvals: HashMap<Uuid, MonthlyApproval>,
}

/// Staged writes to one table. `None` marks a deletion.
#[derive(Debug)]
struct Overlay<K, V> {
    writes: HashMap<K, Option<V>>,
}

impl<K, V> Default for Overlay<K, V> {
    fn default() -> Self {
        Self {
            writes: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy, V: Clone> Overlay<K, V> {
    fn get(&self, base: &HashMap<K, V>, key: &K) -> Option<V> {
        match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => base.get(key).cloned(),
        }
    }

    fn filter(&self, base: &HashMap<K, V>, predicate: impl Fn(&V) -> bool) -> Vec<V> {
        let committed = base
            .iter()
            .filter(|(key, _)| !self.writes.contains_key(key))
            .map(|(_, value)| value);
        let staged = self.writes.values().flatten();
        committed
            .chain(staged)
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    fn put(&mut self, key: K, value: V) {
        self.writes.insert(key, Some(value));
    }

    fn remove(&mut self, key: K) {
        self.writes.insert(key, None);
    }

    fn apply(self, base: &mut HashMap<K, V>) {
        for (key, value) in self.writes {
            match value {
                Some(value) => {
                    base.insert(key, value);
                }
                None => {
                    base.remove(&key);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Staged {
    staff_contracts: Overlay<ContractId, StaffContract>,
    client_contracts: Overlay<ContractId, ClientContract>,
    assignments: Overlay<AssignmentId, Assignment>,
    print_history: Overlay<Uuid, PrintHistoryRecord>,
    months: Overlay<MonthId, MonthlyTimeSheet>,
    dailies: Overlay<DailyId, DailyTimeCard>,
    approvals: Overlay<Uuid, MonthlyApproval>,
}

/// A thread-safe in-memory [`Repository`].
///
/// Master data (staff, payroll, policies, patterns, minimum wages) is loaded
/// with the `insert_*` methods; transactional records go through [`Store`].
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    fail_commits: AtomicBool,
}

fn poisoned() -> EngineError {
    EngineError::Storage {
        message: "repository lock poisoned".to_string(),
    }
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| poisoned())
    }

    /// Makes every subsequent commit fail with a storage error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Adds or replaces a staff member.
    pub fn insert_staff(&self, staff: Staff) -> EngineResult<()> {
        self.write()?.staff.insert(staff.id, staff);
        Ok(())
    }

    /// Adds or replaces a staff member's insurance records.
    pub fn insert_payroll(&self, payroll: StaffPayroll) -> EngineResult<()> {
        self.write()?.payroll.insert(payroll.staff_id, payroll);
        Ok(())
    }

    /// Adds or replaces an employment-type master row.
    pub fn insert_employment_type(&self, row: EmploymentType) -> EngineResult<()> {
        self.write()?.employment_types.insert(row.id, row);
        Ok(())
    }

    /// Adds or replaces a job-category master row.
    pub fn insert_job_category(&self, row: JobCategory) -> EngineResult<()> {
        self.write()?.job_categories.insert(row.id, row);
        Ok(())
    }

    /// Adds or replaces an overtime pattern.
    pub fn insert_policy(&self, pattern: OvertimePattern) -> EngineResult<()> {
        self.write()?.policies.insert(pattern.id, pattern);
        Ok(())
    }

    /// Adds or replaces a time-punch rounding policy.
    pub fn insert_time_punch(&self, punch: TimePunch) -> EngineResult<()> {
        self.write()?.time_punches.insert(punch.id, punch);
        Ok(())
    }

    /// Adds or replaces a work-time pattern.
    pub fn insert_worktime_pattern(&self, pattern: WorkTimePattern) -> EngineResult<()> {
        self.write()?.worktime_patterns.insert(pattern.id, pattern);
        Ok(())
    }

    /// Replaces the minimum-wage table.
    pub fn set_minimum_wages(&self, table: MinimumWageTable) -> EngineResult<()> {
        self.write()?.minimum_wages = table;
        Ok(())
    }

    /// Adds or replaces a staff-side contract outside any transaction.
    pub fn insert_staff_contract(&self, contract: StaffContract) -> EngineResult<()> {
        self.write()?.staff_contracts.insert(contract.id, contract);
        Ok(())
    }

    /// Adds or replaces a client-side contract outside any transaction.
    pub fn insert_client_contract(&self, contract: ClientContract) -> EngineResult<()> {
        self.write()?.client_contracts.insert(contract.id, contract);
        Ok(())
    }
}

impl Repository for InMemoryRepository {
    type Tx<'a> = MemoryTx<'a>;

    fn begin(&self) -> EngineResult<MemoryTx<'_>> {
        Ok(MemoryTx {
            repo: self,
            staged: Staged::default(),
        })
    }
}

/// A transaction against an [`InMemoryRepository`].
#[derive(Debug)]
pub struct MemoryTx<'a> {
    repo: &'a InMemoryRepository,
    staged: Staged,
}

impl MemoryTx<'_> {
    fn master<K: Eq + Hash, V: Clone>(
        &self,
        entity: &'static str,
        id: K,
        table: impl Fn(&Tables) -> &HashMap<K, V>,
    ) -> EngineResult<V>
    where
        K: ToString,
    {
        let tables = self.repo.read()?;
        table(&*tables)
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(entity, id))
    }
}

impl Store for MemoryTx<'_> {
    fn get_staff(&self, id: StaffId) -> EngineResult<Staff> {
        self.master("staff", id, |t| &t.staff)
    }

    fn find_payroll(&self, staff_id: StaffId) -> EngineResult<Option<StaffPayroll>> {
        Ok(self.repo.read()?.payroll.get(&staff_id).cloned())
    }

    fn get_employment_type(&self, id: Uuid) -> EngineResult<EmploymentType> {
        self.master("employment type", id, |t| &t.employment_types)
    }

    fn get_job_category(&self, id: Uuid) -> EngineResult<JobCategory> {
        self.master("job category", id, |t| &t.job_categories)
    }

    fn get_policy(&self, id: Uuid) -> EngineResult<OvertimePattern> {
        self.master("overtime pattern", id, |t| &t.policies)
    }

    fn get_time_punch(&self, id: Uuid) -> EngineResult<TimePunch> {
        self.master("time punch", id, |t| &t.time_punches)
    }

    fn get_worktime_pattern(&self, id: Uuid) -> EngineResult<WorkTimePattern> {
        self.master("work-time pattern", id, |t| &t.worktime_patterns)
    }

    fn get_legal_minimum_wage(
        &self,
        prefecture: &str,
        on_date: NaiveDate,
    ) -> EngineResult<Option<Decimal>> {
        Ok(self.repo.read()?.minimum_wages.lookup(prefecture, on_date))
    }

    fn get_staff_contract(&self, id: ContractId) -> EngineResult<StaffContract> {
        let tables = self.repo.read()?;
        self.staged
            .staff_contracts
            .get(&tables.staff_contracts, &id)
            .ok_or_else(|| EngineError::not_found("staff contract", id))
    }

    fn list_staff_contracts(&self, staff_id: StaffId) -> EngineResult<Vec<StaffContract>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .staff_contracts
            .filter(&tables.staff_contracts, |c| c.staff_id == staff_id))
    }

    fn save_staff_contract(&mut self, contract: &StaffContract) -> EngineResult<()> {
        self.staged.staff_contracts.put(contract.id, contract.clone());
        Ok(())
    }

    fn delete_staff_contract(&mut self, id: ContractId) -> EngineResult<()> {
        self.staged.staff_contracts.remove(id);
        Ok(())
    }

    fn get_client_contract(&self, id: ContractId) -> EngineResult<ClientContract> {
        let tables = self.repo.read()?;
        self.staged
            .client_contracts
            .get(&tables.client_contracts, &id)
            .ok_or_else(|| EngineError::not_found("client contract", id))
    }

    fn save_client_contract(&mut self, contract: &ClientContract) -> EngineResult<()> {
        self.staged.client_contracts.put(contract.id, contract.clone());
        Ok(())
    }

    fn delete_client_contract(&mut self, id: ContractId) -> EngineResult<()> {
        self.staged.client_contracts.remove(id);
        Ok(())
    }

    // Sequences advance immediately and are not rolled back, so numbers may
    // have gaps but are never reused.
    fn allocate_contract_number(&mut self, tenant_id: &str, prefix: &str) -> EngineResult<String> {
        let mut tables = self.repo.write()?;
        let sequence = tables
            .contract_sequences
            .entry(tenant_id.to_string())
            .or_insert(0);
        *sequence += 1;
        Ok(format!("{prefix}-{:06}", *sequence))
    }

    fn get_assignment(&self, id: AssignmentId) -> EngineResult<Assignment> {
        let tables = self.repo.read()?;
        self.staged
            .assignments
            .get(&tables.assignments, &id)
            .ok_or_else(|| EngineError::not_found("assignment", id))
    }

    fn find_assignment(
        &self,
        client_contract_id: ContractId,
        staff_contract_id: ContractId,
    ) -> EngineResult<Option<Assignment>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .assignments
            .filter(&tables.assignments, |a| {
                a.client_contract_id == client_contract_id
                    && a.staff_contract_id == staff_contract_id
            })
            .into_iter()
            .next())
    }

    fn list_assignments_for_staff_contract(
        &self,
        id: ContractId,
    ) -> EngineResult<Vec<Assignment>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .assignments
            .filter(&tables.assignments, |a| a.staff_contract_id == id))
    }

    fn list_assignments_for_client_contract(
        &self,
        id: ContractId,
    ) -> EngineResult<Vec<Assignment>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .assignments
            .filter(&tables.assignments, |a| a.client_contract_id == id))
    }

    fn save_assignment(&mut self, assignment: &Assignment) -> EngineResult<()> {
        self.staged.assignments.put(assignment.id, assignment.clone());
        Ok(())
    }

    fn delete_assignment(&mut self, id: AssignmentId) -> EngineResult<()> {
        self.staged.assignments.remove(id);
        Ok(())
    }

    fn list_print_history(
        &self,
        assignment_id: AssignmentId,
    ) -> EngineResult<Vec<PrintHistoryRecord>> {
        let tables = self.repo.read()?;
        let mut rows = self
            .staged
            .print_history
            .filter(&tables.print_history, |r| r.assignment_id == assignment_id);
        rows.sort_by_key(|r| r.printed_at);
        Ok(rows)
    }

    fn append_print_history(&mut self, record: &PrintHistoryRecord) -> EngineResult<()> {
        self.staged.print_history.put(record.id, record.clone());
        Ok(())
    }

    fn get_month_by_id(&self, id: MonthId) -> EngineResult<MonthlyTimeSheet> {
        let tables = self.repo.read()?;
        self.staged
            .months
            .get(&tables.months, &id)
            .ok_or_else(|| EngineError::not_found("monthly time-sheet", id))
    }

    fn find_month(
        &self,
        contract_id: ContractId,
        year_month: YearMonth,
    ) -> EngineResult<Option<MonthlyTimeSheet>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .months
            .filter(&tables.months, |m| {
                m.contract_id == contract_id && m.year_month == year_month
            })
            .into_iter()
            .next())
    }

    fn list_months(&self, contract_id: ContractId) -> EngineResult<Vec<MonthlyTimeSheet>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .months
            .filter(&tables.months, |m| m.contract_id == contract_id))
    }

    fn save_month(&mut self, month: &MonthlyTimeSheet) -> EngineResult<()> {
        self.staged.months.put(month.id, month.clone());
        Ok(())
    }

    fn delete_month(&mut self, id: MonthId) -> EngineResult<()> {
        self.staged.months.remove(id);
        Ok(())
    }

    fn list_daily(&self, month_id: MonthId) -> EngineResult<Vec<DailyTimeCard>> {
        let tables = self.repo.read()?;
        let mut cards = self
            .staged
            .dailies
            .filter(&tables.dailies, |c| c.month_id == month_id);
        cards.sort_by_key(|c| c.work_date);
        Ok(cards)
    }

    fn get_daily(&self, id: DailyId) -> EngineResult<DailyTimeCard> {
        let tables = self.repo.read()?;
        self.staged
            .dailies
            .get(&tables.dailies, &id)
            .ok_or_else(|| EngineError::not_found("daily time-card", id))
    }

    fn find_daily(
        &self,
        month_id: MonthId,
        work_date: NaiveDate,
    ) -> EngineResult<Option<DailyTimeCard>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .dailies
            .filter(&tables.dailies, |c| {
                c.month_id == month_id && c.work_date == work_date
            })
            .into_iter()
            .next())
    }

    fn save_daily(&mut self, card: &DailyTimeCard) -> EngineResult<()> {
        self.staged.dailies.put(card.id, card.clone());
        Ok(())
    }

    fn delete_daily(&mut self, id: DailyId) -> EngineResult<()> {
        self.staged.dailies.remove(id);
        Ok(())
    }

    fn list_approvals(&self, staff_id: StaffId) -> EngineResult<Vec<MonthlyApproval>> {
        let tables = self.repo.read()?;
        Ok(self
            .staged
            .approvals
            .filter(&tables.approvals, |a| a.staff_id == staff_id))
    }

    fn get_approval(&self, id: Uuid) -> EngineResult<MonthlyApproval> {
        let tables = self.repo.read()?;
        self.staged
            .approvals
            .get(&tables.approvals, &id)
            .ok_or_else(|| EngineError::not_found("monthly approval", id))
    }

    fn save_approval(&mut self, approval: &MonthlyApproval) -> EngineResult<()> {
        self.staged.approvals.put(approval.id, approval.clone());
        Ok(())
    }

    fn commit(self) -> EngineResult<()> {
        if self.repo.fail_commits.load(Ordering::SeqCst) {
            return Err(EngineError::Storage {
                message: "commit rejected".to_string(),
            });
        }
        let mut tables = self.repo.write()?;
        let Staged {
            staff_contracts,
            client_contracts,
            assignments,
            print_history,
            months,
            dailies,
            approvals,
        } = self.staged;
        staff_contracts.apply(&mut tables.staff_contracts);
        client_contracts.apply(&mut tables.client_contracts);
        assignments.apply(&mut tables.assignments);
        print_history.apply(&mut tables.print_history);
        months.apply(&mut tables.months);
        dailies.apply(&mut tables.dailies);
        approvals.apply(&mut tables.approvals);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkType;

    fn month() -> MonthlyTimeSheet {
        MonthlyTimeSheet::open(Uuid::new_v4(), Uuid::new_v4(), YearMonth::new(2023, 4).unwrap())
    }

    #[test]
    fn test_uncommitted_writes_are_invisible() {
        let repo = InMemoryRepository::new();
        let m = month();
        {
            let mut tx = repo.begin().unwrap();
            tx.save_month(&m).unwrap();
            assert!(tx.get_month_by_id(m.id).is_ok());
        }
        let tx = repo.begin().unwrap();
        assert!(matches!(
            tx.get_month_by_id(m.id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_commit_publishes_writes() {
        let repo = InMemoryRepository::new();
        let m = month();
        let mut tx = repo.begin().unwrap();
        tx.save_month(&m).unwrap();
        tx.commit().unwrap();

        let tx = repo.begin().unwrap();
        assert_eq!(tx.get_month_by_id(m.id).unwrap(), m);
        assert_eq!(tx.find_month(m.contract_id, m.year_month).unwrap(), Some(m));
    }

    #[test]
    fn test_staged_delete_hides_committed_row() {
        let repo = InMemoryRepository::new();
        let m = month();
        let day = NaiveDate::from_ymd_opt(2023, 4, 3).unwrap();
        let card = DailyTimeCard::new(m.id, m.contract_id, day, WorkType::Absent);
        let mut tx = repo.begin().unwrap();
        tx.save_daily(&card).unwrap();
        tx.commit().unwrap();

        let mut tx = repo.begin().unwrap();
        tx.delete_daily(card.id).unwrap();
        assert!(tx.list_daily(m.id).unwrap().is_empty());
        assert!(tx.find_daily(m.id, day).unwrap().is_none());
    }

    #[test]
    fn test_list_daily_sorted_by_date() {
        let repo = InMemoryRepository::new();
        let m = month();
        let mut tx = repo.begin().unwrap();
        for d in [20, 3, 11] {
            let date = NaiveDate::from_ymd_opt(2023, 4, d).unwrap();
            tx.save_daily(&DailyTimeCard::new(m.id, m.contract_id, date, WorkType::NoWork))
                .unwrap();
        }
        let days: Vec<_> = tx
            .list_daily(m.id)
            .unwrap()
            .iter()
            .map(|c| c.work_date)
            .collect();
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_failed_commit_leaves_state_unchanged() {
        let repo = InMemoryRepository::new();
        repo.fail_commits(true);
        let m = month();
        let mut tx = repo.begin().unwrap();
        tx.save_month(&m).unwrap();
        assert!(matches!(tx.commit(), Err(EngineError::Storage { .. })));

        repo.fail_commits(false);
        let tx = repo.begin().unwrap();
        assert!(tx.find_month(m.contract_id, m.year_month).unwrap().is_none());
    }

    #[test]
    fn test_contract_numbers_per_tenant() {
        let repo = InMemoryRepository::new();
        let mut tx = repo.begin().unwrap();
        assert_eq!(tx.allocate_contract_number("t1", "KT").unwrap(), "KT-000001");
        assert_eq!(tx.allocate_contract_number("t1", "KT").unwrap(), "KT-000002");
        assert_eq!(tx.allocate_contract_number("t2", "ZZ").unwrap(), "ZZ-000001");
    }
}
