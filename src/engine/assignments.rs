//! Assignment validation, creation, detachment and conflict dates.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, AssignmentId, AssignmentPeriod, ClientContract, ContractId, ContractStatus,
    EmploymentType, JobCategory, Staff, StaffContract, StaffId, StaffPayroll,
};
use crate::repository::{Repository, Store};
use crate::validation::{
    AssignmentContext, ConflictDate, FindingCode, MinimumWage, ValidationMode, ValidationReport,
    conflict_date, parse_prefecture, validate_assignment,
};

/// The result of [`Engine::create_assignment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    /// The stored assignment.
    pub assignment: Assignment,
    /// Warnings and the profit margin from validation.
    pub report: ValidationReport,
    /// Whether this call created the assignment.
    pub created: bool,
}

/// Everything the assignment rules read, owned.
pub(super) struct LoadedContext {
    staff: Staff,
    staff_contract: StaffContract,
    client_contract: ClientContract,
    staff_job_category: Option<JobCategory>,
    client_job_category: Option<JobCategory>,
    employment_type: Option<EmploymentType>,
    payroll: Option<StaffPayroll>,
    minimum_wage: Option<MinimumWage>,
}

impl LoadedContext {
    pub(super) fn load<S: Store + ?Sized>(
        tx: &S,
        prefectures: &[String],
        client_contract: ClientContract,
        staff_contract: StaffContract,
    ) -> EngineResult<Self> {
        let staff = tx.get_staff(staff_contract.staff_id)?;
        let staff_job_category = staff_contract
            .job_category_id
            .map(|id| tx.get_job_category(id))
            .transpose()?;
        let client_job_category = client_contract
            .job_category_id
            .map(|id| tx.get_job_category(id))
            .transpose()?;
        let employment_type = staff_contract
            .employment_type_id
            .map(|id| tx.get_employment_type(id))
            .transpose()?;
        let payroll = tx.find_payroll(staff.id)?;

        let prefecture = staff_contract
            .work_location
            .as_deref()
            .and_then(|location| parse_prefecture(location, prefectures));
        let minimum_wage = match prefecture {
            Some(prefecture) => tx
                .get_legal_minimum_wage(prefecture, staff_contract.start_date)?
                .map(|hourly_wage| MinimumWage {
                    prefecture: prefecture.to_string(),
                    hourly_wage,
                }),
            None => None,
        };

        Ok(Self {
            staff,
            staff_contract,
            client_contract,
            staff_job_category,
            client_job_category,
            employment_type,
            payroll,
            minimum_wage,
        })
    }

    pub(super) fn validate(
        &self,
        transition: Option<ContractStatus>,
        mode: ValidationMode,
    ) -> ValidationReport {
        let ctx = AssignmentContext {
            staff: &self.staff,
            staff_contract: &self.staff_contract,
            client_contract: &self.client_contract,
            staff_job_category: self.staff_job_category.as_ref(),
            client_job_category: self.client_job_category.as_ref(),
            employment_type: self.employment_type.as_ref(),
            payroll: self.payroll.as_ref(),
            minimum_wage: self.minimum_wage.as_ref(),
            transition,
        };
        validate_assignment(&ctx, mode)
    }
}

fn require_draft(entity: &str, status: ContractStatus, reason: &str) -> EngineResult<()> {
    if status == ContractStatus::Draft {
        Ok(())
    } else {
        Err(EngineError::StateTransitionForbidden {
            entity: entity.to_string(),
            from: status.to_string(),
            to: "assigned".to_string(),
            reason: reason.to_string(),
        })
    }
}

impl<R: Repository> Engine<R> {
    /// Runs the assignment rules for a pair of contracts without saving.
    pub fn validate_assignment(
        &self,
        client_contract_id: ContractId,
        staff_contract_id: ContractId,
    ) -> EngineResult<ValidationReport> {
        let tx = self.repo.begin()?;
        let client = tx.get_client_contract(client_contract_id)?;
        let staff_contract = tx.get_staff_contract(staff_contract_id)?;
        let loaded = LoadedContext::load(&tx, &self.settings.prefectures, client, staff_contract)?;
        Ok(loaded.validate(None, self.settings.validation_mode))
    }

    /// Assigns a staff contract to a client contract.
    ///
    /// Both contracts must be drafts. A second call for the same pair
    /// returns the existing assignment.
    ///
    /// # Errors
    ///
    /// [`EngineError::ValidationFailed`] carrying every finding when any
    /// rule reports an error; nothing is saved.
    pub fn create_assignment(
        &self,
        client_contract_id: ContractId,
        staff_contract_id: ContractId,
    ) -> EngineResult<AssignmentOutcome> {
        self.contract_locks.with(&staff_contract_id, || {
            self.contract_locks.with(&client_contract_id, || {
                self.insert_assignment(client_contract_id, staff_contract_id)
            })
        })
    }

    fn insert_assignment(
        &self,
        client_contract_id: ContractId,
        staff_contract_id: ContractId,
    ) -> EngineResult<AssignmentOutcome> {
        let mut tx = self.repo.begin()?;
        let client = tx.get_client_contract(client_contract_id)?;
        let staff_contract = tx.get_staff_contract(staff_contract_id)?;

        let existing = tx.find_assignment(client_contract_id, staff_contract_id)?;
        if existing.is_none() {
            require_draft(
                "client contract",
                client.status,
                "assignments can only be added to draft client contracts",
            )?;
            require_draft(
                "staff contract",
                staff_contract.status,
                "only draft staff contracts can be assigned",
            )?;
        }

        let loaded =
            LoadedContext::load(&tx, &self.settings.prefectures, client, staff_contract)?;
        let report = loaded.validate(None, self.settings.validation_mode);
        if report.has_errors() {
            warn!(
                client_contract_id = %client_contract_id,
                staff_contract_id = %staff_contract_id,
                findings = report.findings.len(),
                "Assignment rejected by validation"
            );
            return Err(EngineError::ValidationFailed {
                findings: report.findings,
            });
        }

        if let Some(assignment) = existing {
            return Ok(AssignmentOutcome {
                assignment,
                report,
                created: false,
            });
        }

        let assignment = Assignment::new(client_contract_id, staff_contract_id);
        tx.save_assignment(&assignment)?;
        tx.commit()?;
        info!(
            assignment_id = %assignment.id,
            client_contract_id = %client_contract_id,
            staff_contract_id = %staff_contract_id,
            "Assignment created"
        );
        Ok(AssignmentOutcome {
            assignment,
            report,
            created: true,
        })
    }

    /// Removes an assignment while its client contract is still a draft.
    /// Print history is kept.
    pub fn detach_assignment(&self, assignment_id: AssignmentId) -> EngineResult<()> {
        let assignment = self.repo.begin()?.get_assignment(assignment_id)?;
        self.contract_locks.with(&assignment.staff_contract_id, || {
            let mut tx = self.repo.begin()?;
            let assignment = tx.get_assignment(assignment_id)?;
            let client = tx.get_client_contract(assignment.client_contract_id)?;
            if client.status != ContractStatus::Draft {
                return Err(EngineError::StateTransitionForbidden {
                    entity: "assignment".to_string(),
                    from: client.status.to_string(),
                    to: "detached".to_string(),
                    reason: "assignments can only be removed from draft client contracts"
                        .to_string(),
                });
            }
            tx.delete_assignment(assignment_id)?;
            tx.commit()?;
            info!(assignment_id = %assignment_id, "Assignment detached");
            Ok(())
        })
    }

    /// Reports payroll readiness for every staff member assigned to a
    /// client contract that is moving to `target`. Nothing is mutated.
    pub fn validate_client_transition(
        &self,
        client_contract_id: ContractId,
        target: ContractStatus,
    ) -> EngineResult<ValidationReport> {
        let tx = self.repo.begin()?;
        let client = tx.get_client_contract(client_contract_id)?;
        let mut report = ValidationReport::default();
        for assignment in tx.list_assignments_for_client_contract(client_contract_id)? {
            let staff_contract = tx.get_staff_contract(assignment.staff_contract_id)?;
            let loaded = LoadedContext::load(
                &tx,
                &self.settings.prefectures,
                client.clone(),
                staff_contract,
            )?;
            let findings = loaded
                .validate(Some(target), ValidationMode::CollectAll)
                .findings
                .into_iter()
                .filter(|f| f.code == FindingCode::PayrollIncomplete);
            report.findings.extend(findings);
        }
        Ok(report)
    }

    /// The conflict date of a staff member at a client organisation.
    ///
    /// Only dispatch assignments under fixed-term staff contracts count.
    /// `None` when there are none.
    pub fn conflict_date(
        &self,
        staff_id: StaffId,
        client_name: &str,
    ) -> EngineResult<Option<ConflictDate>> {
        let tx = self.repo.begin()?;
        let mut periods = Vec::new();
        for staff_contract in tx.list_staff_contracts(staff_id)? {
            let fixed_term = match staff_contract.employment_type_id {
                Some(id) => tx.get_employment_type(id)?.is_fixed_term,
                None => false,
            };
            if !fixed_term {
                continue;
            }
            for assignment in tx.list_assignments_for_staff_contract(staff_contract.id)? {
                let client = tx.get_client_contract(assignment.client_contract_id)?;
                if client.is_dispatch() && client.client_name == client_name {
                    periods.push(AssignmentPeriod::of(&client, &staff_contract));
                }
            }
        }
        Ok(conflict_date(&periods))
    }

    /// Deletes a staff contract with no assignments, together with its
    /// monthly time-sheets and their cards.
    ///
    /// Holds the contract's lock exclusively, so in-flight card writes finish
    /// first and later ones find the contract gone.
    pub fn delete_staff_contract(&self, contract_id: ContractId) -> EngineResult<()> {
        self.contract_locks.with(&contract_id, || {
            let mut tx = self.repo.begin()?;
            let contract = tx.get_staff_contract(contract_id)?;
            if !tx.list_assignments_for_staff_contract(contract_id)?.is_empty() {
                return Err(EngineError::StateTransitionForbidden {
                    entity: "staff contract".to_string(),
                    from: contract.status.to_string(),
                    to: "deleted".to_string(),
                    reason: "detach its assignments first".to_string(),
                });
            }
            for month in tx.list_months(contract_id)? {
                for card in tx.list_daily(month.id)? {
                    tx.delete_daily(card.id)?;
                }
                tx.delete_month(month.id)?;
            }
            tx.delete_staff_contract(contract_id)?;
            tx.commit()?;
            info!(contract_id = %contract_id, "Staff contract deleted");
            Ok(())
        })
    }

    /// Deletes a client contract with no assignments.
    ///
    /// Runs under the client contract's lock, which assignment creation
    /// also takes.
    pub fn delete_client_contract(&self, contract_id: ContractId) -> EngineResult<()> {
        self.contract_locks.with(&contract_id, || {
            let mut tx = self.repo.begin()?;
            let contract = tx.get_client_contract(contract_id)?;
            if !tx.list_assignments_for_client_contract(contract_id)?.is_empty() {
                return Err(EngineError::StateTransitionForbidden {
                    entity: "client contract".to_string(),
                    from: contract.status.to_string(),
                    to: "deleted".to_string(),
                    reason: "detach its assignments first".to_string(),
                });
            }
            tx.delete_client_contract(contract_id)?;
            tx.commit()?;
            info!(contract_id = %contract_id, "Client contract deleted");
            Ok(())
        })
    }
}
