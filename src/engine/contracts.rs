//! Staff-contract lifecycle and employment-conditions issuance.

use chrono::Utc;
use tracing::info;

use super::Engine;
use super::assignments::LoadedContext;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::{Issuance, employment_conditions, staff_contract};
use crate::models::{Assignment, AssignmentId, ContractId, ContractStatus, StaffContract};
use crate::repository::{Repository, Store};
use crate::validation::ValidationMode;

/// Runs the assignment rules for every assignment of a contract that is
/// moving to `target`, failing on any error finding.
fn validate_for_transition<S: Store + ?Sized>(
    tx: &S,
    prefectures: &[String],
    mode: ValidationMode,
    contract: &StaffContract,
    target: ContractStatus,
) -> EngineResult<()> {
    let mut findings = Vec::new();
    for assignment in tx.list_assignments_for_staff_contract(contract.id)? {
        let client = tx.get_client_contract(assignment.client_contract_id)?;
        let loaded = LoadedContext::load(tx, prefectures, client, contract.clone())?;
        findings.extend(loaded.validate(Some(target), mode).findings);
    }
    if findings.iter().any(|f| f.is_error()) {
        return Err(EngineError::ValidationFailed { findings });
    }
    Ok(())
}

impl<R: Repository> Engine<R> {
    fn with_contract<T>(
        &self,
        contract_id: ContractId,
        f: impl FnOnce(&mut dyn Store, &mut StaffContract, &mut Vec<Assignment>) -> EngineResult<T>,
    ) -> EngineResult<(StaffContract, T)> {
        self.contract_locks.with(&contract_id, || {
            let mut tx = self.repo.begin()?;
            let mut contract = tx.get_staff_contract(contract_id)?;
            let mut assignments = tx.list_assignments_for_staff_contract(contract_id)?;
            let value = f(&mut tx, &mut contract, &mut assignments)?;
            tx.save_staff_contract(&contract)?;
            for assignment in &assignments {
                tx.save_assignment(assignment)?;
            }
            tx.commit()?;
            Ok((contract, value))
        })
    }

    /// `draft → pending`, after payroll readiness of dispatch assignments.
    pub fn request_staff_approval(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |tx, contract, _| {
            staff_contract::request_approval(&mut contract.clone())?;
            validate_for_transition(
                &*tx,
                &self.settings.prefectures,
                self.settings.validation_mode,
                contract,
                ContractStatus::Pending,
            )?;
            staff_contract::request_approval(contract)
        })?;
        info!(contract_id = %contract_id, actor, "Staff contract submitted for approval");
        Ok(contract)
    }

    /// `pending → approved`, after the assignment rules pass.
    pub fn approve_staff_contract(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |tx, contract, _| {
            staff_contract::approve(&mut contract.clone(), actor, Utc::now())?;
            validate_for_transition(
                &*tx,
                &self.settings.prefectures,
                self.settings.validation_mode,
                contract,
                ContractStatus::Approved,
            )?;
            staff_contract::approve(contract, actor, Utc::now())
        })?;
        info!(contract_id = %contract_id, actor, "Staff contract approved");
        Ok(contract)
    }

    /// `approved → issued` with a newly allocated contract number.
    pub fn issue_staff_contract(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |tx, contract, assignments| {
            if contract.status != ContractStatus::Approved {
                // Surface the forbidden transition without burning a number
                return staff_contract::issue(contract, assignments, String::new(), actor, Utc::now());
            }
            let number = tx.allocate_contract_number(
                &self.settings.tenant_id,
                &self.settings.contract_number_prefix,
            )?;
            staff_contract::issue(contract, assignments, number, actor, Utc::now())
        })?;
        info!(
            contract_id = %contract_id,
            contract_number = contract.contract_number.as_deref().unwrap_or_default(),
            actor,
            "Staff contract issued"
        );
        Ok(contract)
    }

    /// `issued → approved`, clearing issuance on every assignment.
    pub fn unissue_staff_contract(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |_, contract, assignments| {
            staff_contract::unissue(contract, assignments)
        })?;
        info!(contract_id = %contract_id, actor, "Staff contract un-issued");
        Ok(contract)
    }

    /// `approved | issued | confirmed → draft`, with the full cascade.
    pub fn revoke_approval(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |_, contract, assignments| {
            staff_contract::revoke_approval(contract, assignments)
        })?;
        info!(contract_id = %contract_id, actor, "Staff contract approval revoked");
        Ok(contract)
    }

    /// `issued → confirmed`.
    pub fn confirm_staff_contract(
        &self,
        contract_id: ContractId,
        actor: &str,
    ) -> EngineResult<StaffContract> {
        let (contract, ()) = self.with_contract(contract_id, |_, contract, _| {
            staff_contract::confirm(contract, Utc::now())
        })?;
        info!(contract_id = %contract_id, actor, "Staff contract confirmed");
        Ok(contract)
    }

    /// Issues the employment-conditions document of an assignment for the
    /// staff contract's current number. The print-history row is
    /// idempotent per number; every call clears the staff confirmation.
    pub fn issue_employment_conditions(
        &self,
        assignment_id: AssignmentId,
        actor: &str,
    ) -> EngineResult<Issuance> {
        let staff_contract_id = self.repo.begin()?.get_assignment(assignment_id)?.staff_contract_id;
        let (_, issuance) = self.with_contract(staff_contract_id, |tx, contract, assignments| {
            let assignment = assignments
                .iter_mut()
                .find(|a| a.id == assignment_id)
                .ok_or_else(|| EngineError::not_found("assignment", assignment_id))?;
            let history = tx.list_print_history(assignment_id)?;
            let issuance =
                employment_conditions::issue(assignment, contract, &history, actor, Utc::now())?;
            if issuance.newly_created {
                tx.append_print_history(&issuance.record)?;
            }
            Ok(issuance)
        })?;
        info!(
            assignment_id = %assignment_id,
            contract_number = %issuance.record.contract_number,
            newly_created = issuance.newly_created,
            "Employment conditions issued"
        );
        Ok(issuance)
    }

    /// Records the staff member's confirmation of the issued document.
    pub fn confirm_employment_conditions(
        &self,
        assignment_id: AssignmentId,
        actor: &str,
    ) -> EngineResult<Assignment> {
        let staff_contract_id = self.repo.begin()?.get_assignment(assignment_id)?.staff_contract_id;
        let (_, assignment) = self.with_contract(staff_contract_id, |tx, contract, assignments| {
            let history = tx.list_print_history(assignment_id)?;
            let assignment = assignments
                .iter_mut()
                .find(|a| a.id == assignment_id)
                .ok_or_else(|| EngineError::not_found("assignment", assignment_id))?;
            employment_conditions::confirm(assignment, contract, &history, actor, Utc::now())?;
            Ok(assignment.clone())
        })?;
        info!(assignment_id = %assignment_id, actor, "Employment conditions confirmed");
        Ok(assignment)
    }

    /// The print history of an assignment, oldest first.
    pub fn print_history(
        &self,
        assignment_id: AssignmentId,
    ) -> EngineResult<Vec<crate::models::PrintHistoryRecord>> {
        self.repo.begin()?.list_print_history(assignment_id)
    }

    /// A staff contract as stored.
    pub fn staff_contract(&self, contract_id: ContractId) -> EngineResult<StaffContract> {
        self.repo.begin()?.get_staff_contract(contract_id)
    }

    /// An assignment as stored.
    pub fn assignment(&self, assignment_id: AssignmentId) -> EngineResult<Assignment> {
        self.repo.begin()?.get_assignment(assignment_id)
    }
}
