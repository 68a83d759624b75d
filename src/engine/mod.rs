//! The engine: orchestrates calculations and lifecycle transitions over a
//! [`Repository`].
//!
//! Each public operation opens one storage transaction, loads what it needs,
//! runs the pure calculation or state-machine code and commits. Operations
//! touching a month's time-cards run under that month's lock and share the
//! staff contract's lock; lifecycle operations and deletions hold the
//! contract's lock exclusively.

mod assignments;
mod contracts;
mod locks;
mod timesheet;

pub use assignments::AssignmentOutcome;
pub use locks::KeyedLocks;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, ContractId, DailyTimeCard, MonthlyTimeSheet, YearMonth};
use crate::repository::Repository;
use crate::validation::ValidationMode;

/// Tenant-level settings the engine needs at runtime.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Tenant the engine serves.
    pub tenant_id: String,
    /// Prefix of allocated contract numbers.
    pub contract_number_prefix: String,
    /// Civil time offset used to read clock punches.
    pub utc_offset: FixedOffset,
    /// How assignment validation reports findings.
    pub validation_mode: ValidationMode,
    /// Prefecture names recognised in work locations.
    pub prefectures: Vec<String>,
}

impl EngineSettings {
    /// Settings for a tenant with an offset in whole hours.
    pub fn new(tenant_id: impl Into<String>, utc_offset_hours: i32) -> EngineResult<Self> {
        let utc_offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            EngineError::invalid_interval(format!("UTC offset {utc_offset_hours}h is out of range"))
        })?;
        let tenant_id = tenant_id.into();
        Ok(Self {
            contract_number_prefix: tenant_id.to_uppercase(),
            tenant_id,
            utc_offset,
            validation_mode: ValidationMode::default(),
            prefectures: Vec::new(),
        })
    }
}

/// The result of a time-card write or daily recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyOutcome {
    /// The card as saved, derived fields included.
    pub card: DailyTimeCard,
    /// The re-aggregated month.
    pub month: MonthlyTimeSheet,
    /// Daily steps followed by monthly steps.
    pub trace: AuditTrace,
}

/// The result of a monthly recompute or a card deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthOutcome {
    /// The re-aggregated month.
    pub month: MonthlyTimeSheet,
    /// Monthly steps and warnings.
    pub trace: AuditTrace,
}

/// The time & attendance engine.
#[derive(Debug)]
pub struct Engine<R> {
    repo: R,
    settings: EngineSettings,
    month_locks: KeyedLocks<(ContractId, YearMonth)>,
    contract_locks: KeyedLocks<ContractId>,
}

impl<R: Repository> Engine<R> {
    /// Creates an engine over a repository.
    pub fn new(repo: R, settings: EngineSettings) -> Self {
        Self {
            repo,
            settings,
            month_locks: KeyedLocks::default(),
            contract_locks: KeyedLocks::default(),
        }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// The tenant settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs `f` under the month's lock, holding the contract's lock in
    /// shared mode so contract deletion and lifecycle writes wait for it.
    fn with_month<T>(
        &self,
        key: &(ContractId, YearMonth),
        f: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        self.contract_locks
            .with_shared(&key.0, || self.month_locks.with(key, f))
    }
}
