//! Validation findings and the report that carries them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::profit_margin::ProfitMargin;

/// How much a finding matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks persistence.
    Error,
    /// Surfaced to the caller; does not block.
    Warning,
}

/// Stable identifier of the rule that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    /// The assignment runs past the foreign resident's period of stay.
    ResidencePeriodExceeded,
    /// A foreign resident's job category is not a specified-skilled-worker one.
    NotSpecifiedSkilledCategory,
    /// A foreign resident dispatched outside an agriculture/fishery category.
    NotAgricultureFisheryCategory,
    /// The assignment looks like prohibited daily dispatch.
    DailyDispatch,
    /// Hourly pay is below the prefecture's minimum wage.
    BelowMinimumWage,
    /// Billing does not exceed pay.
    NonPositiveProfitMargin,
    /// Social-insurance enrollment is not recorded.
    PayrollIncomplete,
    /// The staff contract starts before the hire date.
    ContractBeforeHireDate,
    /// The staff contract ends after the resignation date.
    ContractAfterResignation,
}

impl FindingCode {
    /// The code as it appears in serialized findings.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::ResidencePeriodExceeded => "RESIDENCE_PERIOD_EXCEEDED",
            FindingCode::NotSpecifiedSkilledCategory => "NOT_SPECIFIED_SKILLED_CATEGORY",
            FindingCode::NotAgricultureFisheryCategory => "NOT_AGRICULTURE_FISHERY_CATEGORY",
            FindingCode::DailyDispatch => "DAILY_DISPATCH",
            FindingCode::BelowMinimumWage => "BELOW_MINIMUM_WAGE",
            FindingCode::NonPositiveProfitMargin => "NON_POSITIVE_PROFIT_MARGIN",
            FindingCode::PayrollIncomplete => "PAYROLL_INCOMPLETE",
            FindingCode::ContractBeforeHireDate => "CONTRACT_BEFORE_HIRE_DATE",
            FindingCode::ContractAfterResignation => "CONTRACT_AFTER_RESIGNATION",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(severity, code, message)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Severity.
    pub severity: Severity,
    /// The rule that fired.
    pub code: FindingCode,
    /// Human-readable explanation.
    pub message: String,
}

impl Finding {
    /// Creates a finding.
    pub fn new(severity: Severity, code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }

    /// An error finding.
    pub fn error(code: FindingCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// A warning finding.
    pub fn warning(code: FindingCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Whether this finding blocks persistence.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Everything the validator reports about one assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings in rule order.
    pub findings: Vec<Finding>,
    /// The margin, when billing and pay share a unit.
    pub profit_margin: Option<ProfitMargin>,
}

impl ValidationReport {
    /// Whether any finding blocks persistence.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// The warning findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    /// Whether a rule fired.
    pub fn contains(&self, code: FindingCode) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&FindingCode::BelowMinimumWage).unwrap();
        assert_eq!(json, "\"BELOW_MINIMUM_WAGE\"");
        assert_eq!(FindingCode::BelowMinimumWage.as_str(), "BELOW_MINIMUM_WAGE");
    }

    #[test]
    fn test_report_errors_and_warnings() {
        let report = ValidationReport {
            findings: vec![
                Finding::warning(FindingCode::DailyDispatch, "short dispatch"),
                Finding::error(FindingCode::PayrollIncomplete, "no pension"),
            ],
            profit_margin: None,
        };
        assert!(report.has_errors());
        assert_eq!(report.warnings().count(), 1);
        assert!(report.contains(FindingCode::DailyDispatch));
        assert!(!report.contains(FindingCode::BelowMinimumWage));
    }
}
