//! Audit trace models.
//!
//! Every daily calculation and monthly aggregation records the rules it
//! applied as an ordered list of [`AuditStep`]s, so a totals line can be
//! traced back to the inputs and thresholds that produced it.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// # Example
///
/// ```
/// use kintai_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "daily_work_minutes".to_string(),
///     rule_name: "Daily Work Minutes".to_string(),
///     legal_ref: "Labour Standards Act art. 32".to_string(),
///     input: serde_json::json!({"gross_span": 600, "total_break": 60}),
///     output: serde_json::json!({"work_minutes": 540}),
///     reasoning: "600 minutes on site less 60 minutes of breaks".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Statutory reference for the rule, empty when there is none.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings never change totals; they surface conditions a reviewer
/// should look at before approving the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium" or "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace of a recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 3,
            rule_id: "late_night_minutes".to_string(),
            rule_name: "Late-Night Minutes".to_string(),
            legal_ref: "Labour Standards Act art. 37(4)".to_string(),
            input: serde_json::json!({"span": [780, 1380]}),
            output: serde_json::json!({"late_night_minutes": 60}),
            reasoning: "22:00-23:00 falls inside the late-night window".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"legal_ref\":\"Labour Standards Act art. 37(4)\""));

        let parsed: AuditStep = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, step);
    }

    #[test]
    fn test_empty_trace_default() {
        let trace = AuditTrace::default();
        assert!(trace.steps.is_empty());
        assert!(trace.warnings.is_empty());
        assert_eq!(trace.duration_us, 0);
    }

    #[test]
    fn test_warning_constructor() {
        let warning = AuditWarning::new("WEEKLY_THRESHOLD_EXCEEDED", "week 14 over 40h", "medium");
        assert_eq!(warning.code, "WEEKLY_THRESHOLD_EXCEEDED");
        assert_eq!(warning.severity, "medium");
    }
}
