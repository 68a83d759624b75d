//! Overtime patterns: the four calculation regimes and their shared thresholds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::YearMonth;

/// Upper bound for any legal-hours entry (a 31-day month worked around the clock).
pub const MAX_LEGAL_HOURS: u32 = 31 * 24;

/// An `(hours, minutes)` quantity as configured on a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalHours {
    /// Whole hours.
    pub hours: u32,
    /// Additional minutes, 0-59.
    #[serde(default)]
    pub minutes: u32,
}

impl LegalHours {
    /// Creates an entry.
    pub const fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Total minutes.
    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

fn statutory_28() -> Option<LegalHours> {
    Some(LegalHours::new(160, 0))
}

fn statutory_29() -> Option<LegalHours> {
    Some(LegalHours::new(165, 42))
}

fn statutory_30() -> Option<LegalHours> {
    Some(LegalHours::new(171, 25))
}

fn statutory_31() -> Option<LegalHours> {
    Some(LegalHours::new(177, 8))
}

/// Legal monthly working hours keyed by month length.
///
/// Defaults to the statutory 40-hour-week values. An entry explicitly set to
/// `null` makes the pattern unusable for months of that length under the
/// variable and flextime regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalHoursTable {
    /// 28-day months.
    #[serde(default = "statutory_28")]
    pub days_28: Option<LegalHours>,
    /// 29-day months.
    #[serde(default = "statutory_29")]
    pub days_29: Option<LegalHours>,
    /// 30-day months.
    #[serde(default = "statutory_30")]
    pub days_30: Option<LegalHours>,
    /// 31-day months.
    #[serde(default = "statutory_31")]
    pub days_31: Option<LegalHours>,
}

impl Default for LegalHoursTable {
    fn default() -> Self {
        Self {
            days_28: statutory_28(),
            days_29: statutory_29(),
            days_30: statutory_30(),
            days_31: statutory_31(),
        }
    }
}

impl LegalHoursTable {
    /// The configured entry for a month length, if any.
    pub fn entry(&self, days_in_month: u32) -> Option<LegalHours> {
        match days_in_month {
            28 => self.days_28,
            29 => self.days_29,
            30 => self.days_30,
            31 => self.days_31,
            _ => None,
        }
    }

    fn entries(&self) -> [(u32, Option<LegalHours>); 4] {
        [
            (28, self.days_28),
            (29, self.days_29),
            (30, self.days_30),
            (31, self.days_31),
        ]
    }
}

/// Thresholds and flags common to every regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    /// Whether late-night minutes are carried into the month totals.
    pub calculate_midnight_premium: bool,
    /// Whether a daily overtime threshold applies.
    pub daily_overtime_enabled: bool,
    /// Daily threshold, hours part.
    pub daily_overtime_hours: u32,
    /// Daily threshold, minutes part.
    pub daily_overtime_minutes: u32,
    /// Whether the weekly threshold is checked.
    pub weekly_overtime_enabled: bool,
    /// Weekly threshold, hours part.
    pub weekly_overtime_hours: u32,
    /// Weekly threshold, minutes part.
    pub weekly_overtime_minutes: u32,
    /// Whether a monthly premium threshold applies.
    pub monthly_overtime_enabled: bool,
    /// Monthly premium threshold in hours.
    pub monthly_overtime_hours: u32,
    /// Whether fixed estimated overtime is configured.
    pub monthly_estimated_enabled: bool,
    /// Estimated overtime in hours.
    pub monthly_estimated_hours: u32,
    /// Legal monthly hours by month length.
    pub legal_hours: LegalHoursTable,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            calculate_midnight_premium: false,
            daily_overtime_enabled: false,
            daily_overtime_hours: 8,
            daily_overtime_minutes: 0,
            weekly_overtime_enabled: false,
            weekly_overtime_hours: 40,
            weekly_overtime_minutes: 0,
            monthly_overtime_enabled: false,
            monthly_overtime_hours: 60,
            monthly_estimated_enabled: false,
            monthly_estimated_hours: 20,
            legal_hours: LegalHoursTable::default(),
        }
    }
}

impl SharedConfig {
    /// Daily threshold in minutes, when enabled.
    pub fn daily_threshold_minutes(&self) -> Option<u32> {
        self.daily_overtime_enabled
            .then(|| self.daily_overtime_hours * 60 + self.daily_overtime_minutes)
    }

    /// Weekly threshold in minutes, when enabled.
    pub fn weekly_threshold_minutes(&self) -> Option<u32> {
        self.weekly_overtime_enabled
            .then(|| self.weekly_overtime_hours * 60 + self.weekly_overtime_minutes)
    }

    /// Monthly premium threshold in minutes, when enabled.
    pub fn monthly_threshold_minutes(&self) -> Option<u32> {
        self.monthly_overtime_enabled
            .then(|| self.monthly_overtime_hours * 60)
    }

    /// Estimated fixed overtime in minutes, when enabled.
    pub fn estimated_minutes(&self) -> Option<u32> {
        self.monthly_estimated_enabled
            .then(|| self.monthly_estimated_hours * 60)
    }
}

fn default_range_min() -> u32 {
    140
}

fn default_range_max() -> u32 {
    160
}

/// The regime-specific part of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyVariant {
    /// Overtime by daily threshold; monthly cap reported only.
    Premium,
    /// Overtime and deduction relative to a monthly band.
    MonthlyRange {
        /// Lower edge of the band in hours.
        #[serde(default = "default_range_min")]
        min_hours: u32,
        /// Upper edge of the band in hours.
        #[serde(default = "default_range_max")]
        max_hours: u32,
    },
    /// One-month variable working time.
    Variable,
    /// One-month flextime.
    Flextime,
}

impl PolicyVariant {
    /// Stable lowercase name of the regime.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyVariant::Premium => "premium",
            PolicyVariant::MonthlyRange { .. } => "monthly_range",
            PolicyVariant::Variable => "variable",
            PolicyVariant::Flextime => "flextime",
        }
    }

    /// Whether daily overtime is written onto time-cards under this regime.
    pub fn reports_daily_overtime(&self) -> bool {
        matches!(self, PolicyVariant::Premium | PolicyVariant::Variable)
    }
}

/// A calculation policy referenced by staff contracts.
///
/// # Example
///
/// ```
/// use kintai_engine::models::YearMonth;
/// use kintai_engine::policy::{OvertimePattern, PolicyVariant};
///
/// let pattern = OvertimePattern::new("Flex", PolicyVariant::Flextime);
/// let april = YearMonth::new(2023, 4).unwrap();
/// assert_eq!(pattern.legal_minutes(april).unwrap(), 171 * 60 + 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimePattern {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Thresholds common to every regime.
    #[serde(default)]
    pub shared: SharedConfig,
    /// The regime and its own configuration.
    pub variant: PolicyVariant,
}

impl OvertimePattern {
    /// A pattern with default shared configuration.
    pub fn new(name: impl Into<String>, variant: PolicyVariant) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            shared: SharedConfig::default(),
            variant,
        }
    }

    fn misconfigured(&self, message: String) -> EngineError {
        EngineError::PolicyMisconfigured {
            policy: self.name.clone(),
            message,
        }
    }

    /// Checks the ranges every pattern must respect.
    pub fn validate(&self) -> EngineResult<()> {
        for (days, entry) in self.shared.legal_hours.entries() {
            if let Some(entry) = entry {
                if entry.hours > MAX_LEGAL_HOURS {
                    return Err(self.misconfigured(format!(
                        "days_{days}_hours {} exceeds {MAX_LEGAL_HOURS}",
                        entry.hours
                    )));
                }
                if entry.minutes > 59 {
                    return Err(self.misconfigured(format!(
                        "days_{days}_minutes {} is outside 0-59",
                        entry.minutes
                    )));
                }
            }
        }

        if self.shared.daily_overtime_minutes > 59 {
            return Err(self.misconfigured(format!(
                "daily_overtime_minutes {} is outside 0-59",
                self.shared.daily_overtime_minutes
            )));
        }
        if self.shared.weekly_overtime_minutes > 59 {
            return Err(self.misconfigured(format!(
                "weekly_overtime_minutes {} is outside 0-59",
                self.shared.weekly_overtime_minutes
            )));
        }

        if let PolicyVariant::MonthlyRange {
            min_hours,
            max_hours,
        } = self.variant
        {
            if min_hours > max_hours {
                return Err(self.misconfigured(format!(
                    "monthly_range_min {min_hours} is greater than monthly_range_max {max_hours}"
                )));
            }
        }

        Ok(())
    }

    /// Legal minutes for the month's length.
    ///
    /// Fails with [`EngineError::PolicyMisconfigured`] when the table has no
    /// entry for that length.
    pub fn legal_minutes(&self, month: YearMonth) -> EngineResult<u32> {
        let days = month.days_in_month();
        self.shared
            .legal_hours
            .entry(days)
            .map(|entry| entry.total_minutes())
            .ok_or_else(|| self.misconfigured(format!("no legal hours for {days}-day months")))
    }
}
