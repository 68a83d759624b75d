//! Configuration types for a tenant.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a tenant directory.

use serde::Deserialize;

use crate::models::WorkTimePattern;
use crate::policy::{OvertimePattern, TimePunch};
use crate::validation::{MinimumWageRow, MinimumWageTable, ValidationMode};

fn default_utc_offset_hours() -> i32 {
    9
}

/// Tenant identity and engine settings (`tenant.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct TenantConfig {
    /// Tenant identifier; contract numbers are allocated per tenant.
    pub tenant_id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Prefix of allocated contract numbers (e.g. `KT` gives `KT-000001`).
    pub contract_number_prefix: String,
    /// Offset of the civil time zone from UTC, in hours.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Whether assignment validation collects every finding or stops early.
    #[serde(default)]
    pub validation_mode: ValidationMode,
    /// Prefecture names recognised in free-text work locations.
    #[serde(default)]
    pub prefectures: Vec<String>,
}

/// Minimum-wage revisions (`minimum_wages.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct MinimumWagesConfig {
    /// One row per prefecture and start date.
    #[serde(default)]
    pub minimum_wages: Vec<MinimumWageRow>,
}

/// Calculation policies and templates (`policies.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoliciesConfig {
    /// Overtime patterns referenced by staff contracts.
    #[serde(default)]
    pub overtime_patterns: Vec<OvertimePattern>,
    /// Rounding policies for clock punches.
    #[serde(default)]
    pub time_punches: Vec<TimePunch>,
    /// Work-time templates used to pre-fill cards.
    #[serde(default)]
    pub worktime_patterns: Vec<WorkTimePattern>,
}

/// The complete configuration of one tenant.
#[derive(Debug, Clone)]
pub struct KintaiConfig {
    /// Tenant settings.
    pub tenant: TenantConfig,
    /// Minimum wages, ready for lookups.
    pub minimum_wages: MinimumWageTable,
    /// Policies and templates.
    pub policies: PoliciesConfig,
}

impl KintaiConfig {
    /// Assembles a configuration from its parts.
    pub fn new(
        tenant: TenantConfig,
        minimum_wages: MinimumWagesConfig,
        policies: PoliciesConfig,
    ) -> Self {
        Self {
            tenant,
            minimum_wages: MinimumWageTable {
                rows: minimum_wages.minimum_wages,
            },
            policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_defaults() {
        let yaml = r#"
tenant_id: demo
display_name: Demo Staffing
contract_number_prefix: DM
"#;
        let tenant: TenantConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tenant.utc_offset_hours, 9);
        assert_eq!(tenant.validation_mode, ValidationMode::CollectAll);
        assert!(tenant.prefectures.is_empty());
    }

    #[test]
    fn test_fail_fast_mode() {
        let yaml = r#"
tenant_id: demo
display_name: Demo Staffing
contract_number_prefix: DM
validation_mode: fail_fast
"#;
        let tenant: TenantConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tenant.validation_mode, ValidationMode::FailFast);
    }

    #[test]
    fn test_empty_policies_file() {
        let policies: PoliciesConfig = serde_yaml::from_str("{}").unwrap();
        assert!(policies.overtime_patterns.is_empty());
        assert!(policies.time_punches.is_empty());
    }
}
