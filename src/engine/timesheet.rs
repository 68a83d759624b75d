//! Time-card writes, recomputes and time-sheet status changes.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DailyOutcome, Engine, MonthOutcome};
use crate::calculation::{
    MonthlyAggregation, aggregate_month, calculate_daily, card_from_record, card_from_slot,
};
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::SheetAction;
use crate::lifecycle::timesheet::{apply_to_approval, apply_to_sheet};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, ContractId, DailyId, DailyTimeCard, MonthId, MonthlyApproval,
    MonthlyTimeSheet, SheetStatus, StaffContract, StaffId, TimeRecord, YearMonth,
};
use crate::policy::{OvertimePattern, TimePunch};
use crate::repository::{Repository, Store};

/// Where the inputs of a card write come from.
enum CardInput {
    Manual(DailyTimeCard),
    Punches(TimeRecord),
    Slot(String),
}

fn pattern_for<S: Store>(tx: &S, contract: &StaffContract) -> EngineResult<OvertimePattern> {
    let id = contract
        .overtime_pattern_id
        .ok_or_else(|| EngineError::PolicyMisconfigured {
            policy: contract.name.clone(),
            message: "staff contract has no overtime pattern".to_string(),
        })?;
    tx.get_policy(id)
}

fn punch_for<S: Store>(tx: &S, contract: &StaffContract) -> EngineResult<Option<TimePunch>> {
    contract
        .time_punch_id
        .map(|id| tx.get_time_punch(id))
        .transpose()
}

fn ensure_editable<S: Store>(
    tx: &S,
    month: &MonthlyTimeSheet,
    work_date: NaiveDate,
) -> EngineResult<()> {
    if !month.is_editable() {
        return Err(EngineError::SheetNotEditable {
            month: month.year_month.to_string(),
            status: month.status.to_string(),
        });
    }
    let locked = tx
        .list_approvals(month.staff_id)?
        .into_iter()
        .find(|a| a.is_locking() && a.covers(work_date));
    if let Some(approval) = locked {
        return Err(EngineError::SheetNotEditable {
            month: month.year_month.to_string(),
            status: format!("approval {}", approval.status),
        });
    }
    Ok(())
}

/// Folds the month's cards into its totals and stages the month.
fn fold_month<S: Store>(
    tx: &mut S,
    month: &mut MonthlyTimeSheet,
    pattern: &OvertimePattern,
    start_step_number: u32,
) -> EngineResult<MonthlyAggregation> {
    let cards = tx.list_daily(month.id)?;
    let aggregation = aggregate_month(month.year_month, &cards, pattern, start_step_number)?;
    month.totals = aggregation.totals.clone();
    month.last_recompute_error = None;
    tx.save_month(month)?;
    Ok(aggregation)
}

fn trace(
    daily_steps: Vec<AuditStep>,
    daily_warnings: Vec<AuditWarning>,
    aggregation: MonthlyAggregation,
    started: Instant,
) -> AuditTrace {
    let mut steps = daily_steps;
    steps.extend(aggregation.audit_steps);
    let mut warnings = daily_warnings;
    warnings.extend(aggregation.warnings);
    AuditTrace {
        steps,
        warnings,
        duration_us: started.elapsed().as_micros() as u64,
    }
}

fn next_step(steps: &[AuditStep]) -> u32 {
    steps.len() as u32 + 1
}

impl<R: Repository> Engine<R> {
    /// Saves a manually entered time-card and re-aggregates its month.
    ///
    /// The card is keyed by `(contract_id, work_date)`: an existing card on
    /// that date takes over the new inputs. The month sheet is opened on
    /// first use.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidTimeCard`] for inputs inconsistent with the
    ///   work type or a date outside the contract period
    /// - [`EngineError::InvalidInterval`] for a backwards span
    /// - [`EngineError::SheetNotEditable`] when the sheet is submitted or a
    ///   submitted approval covers the date
    /// - [`EngineError::PolicyMisconfigured`] when the month cannot be
    ///   aggregated; nothing is written and the sheet is flagged
    pub fn save_daily(&self, card: DailyTimeCard) -> EngineResult<DailyOutcome> {
        let key = (card.contract_id, YearMonth::of(card.work_date));
        let (contract_id, work_date) = (card.contract_id, card.work_date);
        self.with_month(&key, || {
            self.write_card(contract_id, work_date, CardInput::Manual(card))
        })
    }

    /// Converts raw clock punches into a time-card and saves it.
    pub fn record_punches(&self, record: TimeRecord) -> EngineResult<DailyOutcome> {
        let key = (record.contract_id, YearMonth::of(record.work_date));
        let (contract_id, work_date) = (record.contract_id, record.work_date);
        self.with_month(&key, || {
            self.write_card(contract_id, work_date, CardInput::Punches(record))
        })
    }

    /// Saves a time-card pre-filled from a slot of the contract's work-time
    /// pattern.
    pub fn prefill_from_slot(
        &self,
        contract_id: ContractId,
        work_date: NaiveDate,
        slot_name: &str,
    ) -> EngineResult<DailyOutcome> {
        let key = (contract_id, YearMonth::of(work_date));
        self.with_month(&key, || {
            self.write_card(contract_id, work_date, CardInput::Slot(slot_name.to_string()))
        })
    }

    fn write_card(
        &self,
        contract_id: ContractId,
        work_date: NaiveDate,
        input: CardInput,
    ) -> EngineResult<DailyOutcome> {
        let started = Instant::now();
        let year_month = YearMonth::of(work_date);
        let mut tx = self.repo.begin()?;

        let contract = tx.get_staff_contract(contract_id)?;
        if !contract.covers(work_date) {
            return Err(EngineError::invalid_card(
                work_date,
                format!("outside the period of staff contract '{}'", contract.name),
            ));
        }
        let mut month = match tx.find_month(contract_id, year_month)? {
            Some(month) => month,
            None => MonthlyTimeSheet::open(contract_id, contract.staff_id, year_month),
        };
        ensure_editable(&tx, &month, work_date)?;

        let pattern = pattern_for(&tx, &contract)?;
        let punch = punch_for(&tx, &contract)?;

        let incoming = match input {
            CardInput::Manual(card) => card,
            CardInput::Punches(record) => {
                card_from_record(&record, month.id, self.settings.utc_offset, punch.as_ref())?
            }
            CardInput::Slot(slot_name) => {
                let pattern_id = contract.worktime_pattern_id.ok_or_else(|| {
                    EngineError::not_found("work-time pattern", &contract.name)
                })?;
                let worktime = tx.get_worktime_pattern(pattern_id)?;
                let slot = worktime
                    .slot(&slot_name)
                    .ok_or_else(|| EngineError::not_found("work slot", &slot_name))?;
                card_from_slot(slot, month.id, contract_id, work_date)?
            }
        };

        let mut card = match tx.find_daily(month.id, work_date)? {
            Some(mut existing) => {
                existing.copy_inputs_from(&incoming);
                existing
            }
            None => incoming,
        };
        card.month_id = month.id;
        card.contract_id = contract_id;
        card.work_date = work_date;

        let daily = calculate_daily(&card, &pattern, punch.as_ref(), 1)?;
        daily.apply_to(&mut card);
        tx.save_daily(&card)?;

        let aggregation = match fold_month(&mut tx, &mut month, &pattern, next_step(&daily.audit_steps)) {
            Ok(aggregation) => aggregation,
            Err(error) => {
                drop(tx);
                return Err(self.flag_month(month.id, error));
            }
        };
        tx.commit()?;

        info!(
            contract_id = %contract_id,
            year_month = %year_month,
            work_date = %work_date,
            work_minutes = card.work_minutes,
            overtime_minutes = card.overtime_minutes,
            "Time-card saved"
        );
        Ok(DailyOutcome {
            card,
            trace: trace(daily.audit_steps, daily.warnings, aggregation, started),
            month,
        })
    }

    /// Deletes a time-card and re-aggregates its month in the same
    /// transaction.
    pub fn delete_daily(&self, daily_id: DailyId) -> EngineResult<MonthOutcome> {
        let key = self.daily_key(daily_id)?;
        self.with_month(&key, || {
            let started = Instant::now();
            let mut tx = self.repo.begin()?;
            let card = tx.get_daily(daily_id)?;
            let mut month = tx.get_month_by_id(card.month_id)?;
            ensure_editable(&tx, &month, card.work_date)?;
            let contract = tx.get_staff_contract(month.contract_id)?;
            let pattern = pattern_for(&tx, &contract)?;

            tx.delete_daily(daily_id)?;
            let aggregation = match fold_month(&mut tx, &mut month, &pattern, 1) {
                Ok(aggregation) => aggregation,
                Err(error) => {
                    drop(tx);
                    return Err(self.flag_month(month.id, error));
                }
            };
            tx.commit()?;

            info!(daily_id = %daily_id, year_month = %month.year_month, "Time-card deleted");
            Ok(MonthOutcome {
                trace: trace(Vec::new(), Vec::new(), aggregation, started),
                month,
            })
        })
    }

    /// Re-derives one card's minutes from its stored inputs and
    /// re-aggregates its month. Allowed in any sheet status.
    pub fn recompute_daily(&self, daily_id: DailyId) -> EngineResult<DailyOutcome> {
        let key = self.daily_key(daily_id)?;
        self.with_month(&key, || {
            let started = Instant::now();
            let mut tx = self.repo.begin()?;
            let mut card = tx.get_daily(daily_id)?;
            let mut month = tx.get_month_by_id(card.month_id)?;
            let contract = tx.get_staff_contract(month.contract_id)?;
            let pattern = pattern_for(&tx, &contract)?;
            let punch = punch_for(&tx, &contract)?;

            let daily = calculate_daily(&card, &pattern, punch.as_ref(), 1)?;
            daily.apply_to(&mut card);
            tx.save_daily(&card)?;
            let aggregation =
                match fold_month(&mut tx, &mut month, &pattern, next_step(&daily.audit_steps)) {
                    Ok(aggregation) => aggregation,
                    Err(error) => {
                        drop(tx);
                        return Err(self.flag_month(month.id, error));
                    }
                };
            tx.commit()?;

            debug!(daily_id = %daily_id, work_minutes = card.work_minutes, "Time-card recomputed");
            Ok(DailyOutcome {
                card,
                trace: trace(daily.audit_steps, daily.warnings, aggregation, started),
                month,
            })
        })
    }

    /// Re-aggregates a month from its stored cards. Allowed in any status.
    ///
    /// The result depends only on the cards and the contract's overtime
    /// pattern, so repeating the call yields identical totals.
    pub fn recompute_month(&self, month_id: MonthId) -> EngineResult<MonthOutcome> {
        let key = self.month_key(month_id)?;
        self.with_month(&key, || {
            let started = Instant::now();
            let mut tx = self.repo.begin()?;
            let mut month = tx.get_month_by_id(month_id)?;
            let contract = tx.get_staff_contract(month.contract_id)?;
            let pattern = match pattern_for(&tx, &contract) {
                Ok(pattern) => pattern,
                Err(error) => {
                    drop(tx);
                    return Err(self.flag_month(month_id, error));
                }
            };
            let aggregation = match fold_month(&mut tx, &mut month, &pattern, 1) {
                Ok(aggregation) => aggregation,
                Err(error) => {
                    drop(tx);
                    return Err(self.flag_month(month_id, error));
                }
            };
            tx.commit()?;

            info!(
                month_id = %month_id,
                year_month = %month.year_month,
                total_work_minutes = month.totals.total_work_minutes,
                warnings = aggregation.warnings.len(),
                "Month recomputed"
            );
            Ok(MonthOutcome {
                trace: trace(Vec::new(), Vec::new(), aggregation, started),
                month,
            })
        })
    }

    /// The month sheet of a contract, if any card was saved for it.
    pub fn find_month(
        &self,
        contract_id: ContractId,
        year_month: YearMonth,
    ) -> EngineResult<Option<MonthlyTimeSheet>> {
        self.repo.begin()?.find_month(contract_id, year_month)
    }

    /// The cards of a month ordered by date.
    pub fn list_daily(&self, month_id: MonthId) -> EngineResult<Vec<DailyTimeCard>> {
        self.repo.begin()?.list_daily(month_id)
    }

    /// `editing → submitted`.
    pub fn submit_month(&self, month_id: MonthId, actor: &str) -> EngineResult<MonthlyTimeSheet> {
        self.transition_month(month_id, SheetAction::Submit, actor, None)
    }

    /// `submitted → approved`.
    pub fn approve_month(&self, month_id: MonthId, actor: &str) -> EngineResult<MonthlyTimeSheet> {
        self.transition_month(month_id, SheetAction::Approve, actor, None)
    }

    /// `submitted → rejected` with a reason.
    pub fn reject_month(
        &self,
        month_id: MonthId,
        actor: &str,
        reason: &str,
    ) -> EngineResult<MonthlyTimeSheet> {
        self.transition_month(month_id, SheetAction::Reject, actor, Some(reason))
    }

    /// `rejected → editing`.
    pub fn reopen_month(&self, month_id: MonthId, actor: &str) -> EngineResult<MonthlyTimeSheet> {
        self.transition_month(month_id, SheetAction::Reopen, actor, None)
    }

    fn transition_month(
        &self,
        month_id: MonthId,
        action: SheetAction,
        actor: &str,
        reason: Option<&str>,
    ) -> EngineResult<MonthlyTimeSheet> {
        let key = self.month_key(month_id)?;
        self.with_month(&key, || {
            let mut tx = self.repo.begin()?;
            let mut month = tx.get_month_by_id(month_id)?;
            apply_to_sheet(&mut month, action, actor, reason, Utc::now())?;
            tx.save_month(&month)?;
            tx.commit()?;
            info!(
                month_id = %month_id,
                action = %action,
                status = %month.status,
                actor,
                "Time-sheet status changed"
            );
            Ok(month)
        })
    }

    /// Opens a submitted approval envelope over a closing period.
    pub fn submit_approval(
        &self,
        staff_id: StaffId,
        period_start: NaiveDate,
        period_end: NaiveDate,
        closing_date: NaiveDate,
    ) -> EngineResult<MonthlyApproval> {
        if period_end < period_start {
            return Err(EngineError::invalid_interval(format!(
                "approval period ends {period_end} before it starts {period_start}"
            )));
        }
        let mut approval = MonthlyApproval {
            id: Uuid::new_v4(),
            staff_id,
            period_start,
            period_end,
            closing_date,
            status: SheetStatus::Editing,
        };
        apply_to_approval(&mut approval, SheetAction::Submit)?;
        let mut tx = self.repo.begin()?;
        tx.save_approval(&approval)?;
        tx.commit()?;
        info!(approval_id = %approval.id, staff_id = %staff_id, "Approval submitted");
        Ok(approval)
    }

    /// Moves an approval envelope through approve, reject or reopen.
    pub fn transition_approval(
        &self,
        approval_id: Uuid,
        action: SheetAction,
    ) -> EngineResult<MonthlyApproval> {
        let mut tx = self.repo.begin()?;
        let mut approval = tx.get_approval(approval_id)?;
        apply_to_approval(&mut approval, action)?;
        tx.save_approval(&approval)?;
        tx.commit()?;
        info!(approval_id = %approval_id, status = %approval.status, "Approval status changed");
        Ok(approval)
    }

    fn daily_key(&self, daily_id: DailyId) -> EngineResult<(ContractId, YearMonth)> {
        let card = self.repo.begin()?.get_daily(daily_id)?;
        Ok((card.contract_id, YearMonth::of(card.work_date)))
    }

    fn month_key(&self, month_id: MonthId) -> EngineResult<(ContractId, YearMonth)> {
        let month = self.repo.begin()?.get_month_by_id(month_id)?;
        Ok((month.contract_id, month.year_month))
    }

    /// Records an aggregation failure on the sheet in its own transaction
    /// and hands the original error back. The previous totals are kept.
    fn flag_month(&self, month_id: MonthId, error: EngineError) -> EngineError {
        warn!(month_id = %month_id, error = %error, "Monthly aggregation failed");
        let flagged = (|| -> EngineResult<()> {
            let mut tx = self.repo.begin()?;
            let mut month = match tx.get_month_by_id(month_id) {
                Ok(month) => month,
                // The sheet was opened by the rolled-back write
                Err(EngineError::NotFound { .. }) => return Ok(()),
                Err(other) => return Err(other),
            };
            month.last_recompute_error = Some(error.to_string());
            tx.save_month(&month)?;
            tx.commit()
        })();
        match flagged {
            Ok(()) => error,
            Err(storage) => storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;
    use crate::models::{MonthlyApproval, TimeOfDay, WorkType};
    use crate::policy::{LegalHours, PolicyVariant};
    use crate::repository::InMemoryRepository;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, d).unwrap()
    }

    fn setup(variant: PolicyVariant) -> (Engine<InMemoryRepository>, StaffContract) {
        let repo = InMemoryRepository::new();
        let mut pattern = OvertimePattern::new("policy", variant);
        pattern.shared.calculate_midnight_premium = true;
        pattern.shared.daily_overtime_enabled = true;
        let mut contract = StaffContract::draft("t1", Uuid::new_v4(), "Packing", date(1), None);
        contract.overtime_pattern_id = Some(pattern.id);
        repo.insert_policy(pattern).unwrap();
        repo.insert_staff_contract(contract.clone()).unwrap();
        let engine = Engine::new(repo, EngineSettings::new("t1", 9).unwrap());
        (engine, contract)
    }

    fn work(contract: &StaffContract, day: u32, start: (u32, u32), end: (u32, u32), brk: u32) -> DailyTimeCard {
        DailyTimeCard::new(Uuid::nil(), contract.id, date(day), WorkType::Work)
            .with_times(
                TimeOfDay::hm(start.0, start.1).unwrap(),
                TimeOfDay::hm(end.0, end.1).unwrap(),
            )
            .with_breaks(brk, 0)
    }

    #[test]
    fn test_save_daily_opens_month_and_aggregates() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let outcome = engine.save_daily(work(&contract, 3, (13, 0), (23, 0), 60)).unwrap();
        assert_eq!(outcome.card.work_minutes, 540);
        assert_eq!(outcome.month.totals.total_work_minutes, 540);
        assert_eq!(outcome.month.totals.total_overtime_minutes, 60);
        assert_eq!(outcome.month.totals.total_late_night_overtime_minutes, 60);
        assert!(!outcome.trace.steps.is_empty());
    }

    #[test]
    fn test_same_date_upserts() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();
        let outcome = engine.save_daily(work(&contract, 3, (9, 0), (17, 0), 60)).unwrap();
        assert_eq!(outcome.month.totals.total_work_days, 1);
        assert_eq!(outcome.month.totals.total_work_minutes, 420);
        assert_eq!(engine.list_daily(outcome.month.id).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_card_leaves_month_unchanged() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let first = engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();
        let broken = work(&contract, 4, (9, 0), (10, 0), 120);
        assert!(matches!(
            engine.save_daily(broken),
            Err(EngineError::InvalidInterval { .. })
        ));
        let month = engine.find_month(contract.id, first.month.year_month).unwrap().unwrap();
        assert_eq!(month.totals, first.month.totals);
    }

    #[test]
    fn test_date_outside_contract_rejected() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let mut card = work(&contract, 3, (9, 0), (18, 0), 60);
        card.work_date = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        assert!(matches!(
            engine.save_daily(card),
            Err(EngineError::InvalidTimeCard { .. })
        ));
    }

    #[test]
    fn test_submitted_sheet_rejects_writes() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let outcome = engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();
        engine.submit_month(outcome.month.id, "staff").unwrap();
        assert!(matches!(
            engine.save_daily(work(&contract, 4, (9, 0), (18, 0), 60)),
            Err(EngineError::SheetNotEditable { .. })
        ));
        // Recompute is still allowed
        assert!(engine.recompute_month(outcome.month.id).is_ok());
    }

    #[test]
    fn test_locking_approval_rejects_writes() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        engine
            .submit_approval(contract.staff_id, date(1), date(15), date(15))
            .unwrap();
        assert!(matches!(
            engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)),
            Err(EngineError::SheetNotEditable { .. })
        ));
        assert!(engine.save_daily(work(&contract, 20, (9, 0), (18, 0), 60)).is_ok());
    }

    #[test]
    fn test_rejected_approval_unlocks() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let approval: MonthlyApproval = engine
            .submit_approval(contract.staff_id, date(1), date(30), date(30))
            .unwrap();
        engine.transition_approval(approval.id, SheetAction::Reject).unwrap();
        assert!(engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).is_ok());
    }

    #[test]
    fn test_delete_daily_reaggregates() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();
        let second = engine.save_daily(work(&contract, 4, (9, 0), (18, 0), 60)).unwrap();
        let outcome = engine.delete_daily(second.card.id).unwrap();
        assert_eq!(outcome.month.totals.total_work_days, 1);
        assert_eq!(outcome.month.totals.total_work_minutes, 480);
    }

    #[test]
    fn test_recompute_month_is_idempotent() {
        let (engine, contract) = setup(PolicyVariant::Flextime);
        let saved = engine.save_daily(work(&contract, 3, (9, 0), (18, 15), 0)).unwrap();
        let first = engine.recompute_month(saved.month.id).unwrap();
        let second = engine.recompute_month(saved.month.id).unwrap();
        assert_eq!(
            serde_json::to_string(&first.month.totals).unwrap(),
            serde_json::to_string(&second.month.totals).unwrap()
        );
    }

    #[test]
    fn test_misconfigured_policy_flags_sheet_and_keeps_totals() {
        let (engine, contract) = setup(PolicyVariant::Flextime);
        let saved = engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();

        let mut broken = engine
            .repository()
            .begin()
            .unwrap()
            .get_policy(contract.overtime_pattern_id.unwrap())
            .unwrap();
        broken.shared.legal_hours.days_30 = None;
        engine.repository().insert_policy(broken).unwrap();

        let error = engine.save_daily(work(&contract, 4, (9, 0), (18, 0), 60)).unwrap_err();
        assert!(matches!(error, EngineError::PolicyMisconfigured { .. }));

        let month = engine.find_month(contract.id, saved.month.year_month).unwrap().unwrap();
        assert_eq!(month.totals, saved.month.totals);
        assert!(month.last_recompute_error.is_some());
        assert_eq!(engine.list_daily(month.id).unwrap().len(), 1);

        // Fixing the pattern clears the flag on the next recompute
        let mut fixed = engine
            .repository()
            .begin()
            .unwrap()
            .get_policy(contract.overtime_pattern_id.unwrap())
            .unwrap();
        fixed.shared.legal_hours.days_30 = Some(LegalHours { hours: 171, minutes: 25 });
        engine.repository().insert_policy(fixed).unwrap();
        let month = engine.recompute_month(month.id).unwrap().month;
        assert!(month.last_recompute_error.is_none());
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        engine.repository().fail_commits(true);
        assert!(matches!(
            engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)),
            Err(EngineError::Storage { .. })
        ));
        engine.repository().fail_commits(false);
        assert!(engine.find_month(contract.id, YearMonth::of(date(3))).unwrap().is_none());
    }

    #[test]
    fn test_reject_and_reopen_month() {
        let (engine, contract) = setup(PolicyVariant::Premium);
        let saved = engine.save_daily(work(&contract, 3, (9, 0), (18, 0), 60)).unwrap();
        engine.submit_month(saved.month.id, "staff").unwrap();
        let rejected = engine.reject_month(saved.month.id, "manager", "day 3 looks wrong").unwrap();
        assert_eq!(rejected.status, SheetStatus::Rejected);
        let reopened = engine.reopen_month(saved.month.id, "staff").unwrap();
        assert!(reopened.is_editable());
        assert!(engine.approve_month(saved.month.id, "manager").is_err());
    }
}
