//! Cross-contract rules gating dispatch assignments.
//!
//! Each rule is an independent predicate over an [`AssignmentContext`].
//! In [`ValidationMode::CollectAll`] every rule runs; in
//! [`ValidationMode::FailFast`] validation stops at the first error.

use serde::{Deserialize, Serialize};

use crate::models::{
    AssignmentPeriod, ClientContract, ContractStatus, EmploymentType, JobCategory, LimitationFlag,
    PayUnit, Staff, StaffContract, StaffPayroll,
};

use super::findings::{Finding, FindingCode, ValidationReport};
use super::minimum_wage::MinimumWage;
use super::profit_margin::profit_margin;

/// Age from which the daily-dispatch restriction no longer applies.
pub const DAILY_DISPATCH_EXEMPT_AGE: u32 = 60;

/// Longest client contract, in days, treated as daily dispatch.
pub const DAILY_DISPATCH_MAX_DAYS: i64 = 30;

/// Whether validation stops at the first error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Run every rule.
    #[default]
    CollectAll,
    /// Stop after the first error finding.
    FailFast,
}

/// Everything the rules read, loaded by the caller.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentContext<'a> {
    /// The staff member.
    pub staff: &'a Staff,
    /// The staff-side contract.
    pub staff_contract: &'a StaffContract,
    /// The client-side contract.
    pub client_contract: &'a ClientContract,
    /// The staff contract's job category.
    pub staff_job_category: Option<&'a JobCategory>,
    /// The client contract's job category.
    pub client_job_category: Option<&'a JobCategory>,
    /// The staff contract's employment type.
    pub employment_type: Option<&'a EmploymentType>,
    /// The staff member's insurance records.
    pub payroll: Option<&'a StaffPayroll>,
    /// Minimum wage for the parsed work-location prefecture on the contract start.
    pub minimum_wage: Option<&'a MinimumWage>,
    /// The status either contract is moving to, when validating a transition.
    pub transition: Option<ContractStatus>,
}

type Rule = fn(&AssignmentContext<'_>) -> Vec<Finding>;

const RULES: [Rule; 8] = [
    residence_period,
    specified_skilled_category,
    agriculture_fishery_category,
    daily_dispatch,
    minimum_wage,
    margin,
    payroll_readiness,
    contract_period,
];

/// Runs the assignment rules.
pub fn validate_assignment(ctx: &AssignmentContext<'_>, mode: ValidationMode) -> ValidationReport {
    let mut report = ValidationReport {
        findings: Vec::new(),
        profit_margin: profit_margin(ctx.client_contract, ctx.staff_contract),
    };

    for rule in RULES {
        report.findings.extend(rule(ctx));
        if mode == ValidationMode::FailFast && report.has_errors() {
            break;
        }
    }

    report
}

fn residence_period(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    let Some(resident) = &ctx.staff.foreign_resident else {
        return Vec::new();
    };
    let period = AssignmentPeriod::of(ctx.client_contract, ctx.staff_contract);
    match period.end {
        Some(end) if end <= resident.residence_period_to => Vec::new(),
        Some(end) => vec![Finding::error(
            FindingCode::ResidencePeriodExceeded,
            format!(
                "assignment ends {end}, after the period of stay ends on {}",
                resident.residence_period_to
            ),
        )],
        None => vec![Finding::error(
            FindingCode::ResidencePeriodExceeded,
            format!(
                "open-ended assignment runs past the period of stay ending {}",
                resident.residence_period_to
            ),
        )],
    }
}

fn specified_skilled_category(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    if ctx.staff.foreign_resident.is_none() {
        return Vec::new();
    }
    if ctx
        .staff_job_category
        .is_some_and(|category| category.is_specified_skilled_worker)
    {
        return Vec::new();
    }
    vec![Finding::error(
        FindingCode::NotSpecifiedSkilledCategory,
        format!(
            "{} is a foreign resident; the job category must be a specified-skilled-worker category",
            ctx.staff.display_name()
        ),
    )]
}

fn agriculture_fishery_category(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    if ctx.staff.foreign_resident.is_none() || !ctx.client_contract.is_dispatch() {
        return Vec::new();
    }
    if ctx
        .staff_job_category
        .is_some_and(|category| category.is_agriculture_fishery_dispatch)
    {
        return Vec::new();
    }
    vec![Finding::error(
        FindingCode::NotAgricultureFisheryCategory,
        "foreign residents may only be dispatched in an agriculture or fishery category",
    )]
}

fn daily_dispatch(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    let client = ctx.client_contract;
    let short = client
        .duration_days()
        .is_some_and(|days| days <= DAILY_DISPATCH_MAX_DAYS);
    if !client.is_dispatch() || !short || client.limitation != Some(LimitationFlag::NotLimited) {
        return Vec::new();
    }
    if ctx.client_job_category.is_some_and(JobCategory::has_seirei) {
        return Vec::new();
    }
    if !ctx.employment_type.is_some_and(|t| t.is_fixed_term) {
        return Vec::new();
    }

    let start = AssignmentPeriod::of(client, ctx.staff_contract).start;
    // Unknown birth date counts as under 60
    let senior = ctx
        .staff
        .age_on(start)
        .is_some_and(|age| age >= DAILY_DISPATCH_EXEMPT_AGE);
    if senior {
        return Vec::new();
    }

    vec![Finding::warning(
        FindingCode::DailyDispatch,
        format!(
            "dispatch of {} days to a fixed-term staff member under {DAILY_DISPATCH_EXEMPT_AGE} may be prohibited daily dispatch",
            client.duration_days().unwrap_or_default()
        ),
    )]
}

fn minimum_wage(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    let contract = ctx.staff_contract;
    if contract.pay_unit != Some(PayUnit::Hourly) {
        return Vec::new();
    }
    let (Some(pay), Some(wage)) = (contract.pay_amount, ctx.minimum_wage) else {
        return Vec::new();
    };
    if pay >= wage.hourly_wage {
        return Vec::new();
    }
    vec![Finding::error(
        FindingCode::BelowMinimumWage,
        format!(
            "hourly pay {pay} is below the {} minimum wage of {} on {}",
            wage.prefecture, wage.hourly_wage, contract.start_date
        ),
    )]
}

fn margin(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    match profit_margin(ctx.client_contract, ctx.staff_contract) {
        Some(margin) if margin.warn_if_non_positive => vec![Finding::warning(
            FindingCode::NonPositiveProfitMargin,
            format!(
                "billing {} does not exceed pay {} (margin {}%)",
                margin.bill_amount,
                margin.pay_amount,
                margin.percent()
            ),
        )],
        _ => Vec::new(),
    }
}

fn payroll_readiness(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    let gated = matches!(
        ctx.transition,
        Some(ContractStatus::Pending | ContractStatus::Approved)
    );
    if !gated || !ctx.client_contract.is_dispatch() {
        return Vec::new();
    }
    let missing = match ctx.payroll {
        None => vec!["health insurance", "welfare pension", "employment insurance"],
        Some(payroll) => payroll.missing_schemes(),
    };
    if missing.is_empty() {
        return Vec::new();
    }
    vec![Finding::error(
        FindingCode::PayrollIncomplete,
        format!(
            "{} has no enrollment or non-enrollment reason for: {}",
            ctx.staff.display_name(),
            missing.join(", ")
        ),
    )]
}

fn contract_period(ctx: &AssignmentContext<'_>) -> Vec<Finding> {
    let contract = ctx.staff_contract;
    let mut findings = Vec::new();

    if let Some(hire) = ctx.staff.hire_date {
        if contract.start_date < hire {
            findings.push(Finding::error(
                FindingCode::ContractBeforeHireDate,
                format!(
                    "contract starts {} before the hire date {hire}",
                    contract.start_date
                ),
            ));
        }
    }
    if let (Some(resigned), Some(end)) = (ctx.staff.resignation_date, contract.end_date) {
        if end > resigned {
            findings.push(Finding::error(
                FindingCode::ContractAfterResignation,
                format!("contract ends {end} after the resignation date {resigned}"),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractType, Enrollment, ForeignResident};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        staff: Staff,
        staff_contract: StaffContract,
        client_contract: ClientContract,
        staff_category: JobCategory,
        client_category: JobCategory,
        employment_type: EmploymentType,
        payroll: StaffPayroll,
        wage: MinimumWage,
    }

    impl Fixture {
        fn new() -> Self {
            let staff = Staff {
                id: Uuid::new_v4(),
                surname: "Suzuki".to_string(),
                given_name: "Ken".to_string(),
                date_of_birth: Some(date(1990, 6, 1)),
                hire_date: Some(date(2023, 1, 1)),
                resignation_date: None,
                foreign_resident: None,
            };
            let mut staff_contract =
                StaffContract::draft("t1", staff.id, "Picking", date(2023, 4, 1), Some(date(2023, 4, 20)));
            staff_contract.pay_unit = Some(PayUnit::Hourly);
            staff_contract.pay_amount = Some(Decimal::new(1200, 0));
            let client_contract = ClientContract {
                id: Uuid::new_v4(),
                tenant_id: "t1".to_string(),
                client_name: "Acme Logistics".to_string(),
                status: ContractStatus::Draft,
                contract_type: ContractType::Dispatch,
                start_date: date(2023, 4, 1),
                end_date: Some(date(2023, 4, 30)),
                bill_unit: Some(PayUnit::Hourly),
                bill_amount: Some(Decimal::new(1800, 0)),
                job_category_id: None,
                limitation: Some(LimitationFlag::NotLimited),
            };
            let category = |name: &str| JobCategory {
                id: Uuid::new_v4(),
                name: name.to_string(),
                is_specified_skilled_worker: false,
                is_agriculture_fishery_dispatch: false,
                seirei: None,
            };
            Self {
                payroll: StaffPayroll {
                    staff_id: staff.id,
                    health_insurance: Enrollment::Enrolled {
                        join_date: date(2023, 1, 1),
                    },
                    welfare_pension: Enrollment::Enrolled {
                        join_date: date(2023, 1, 1),
                    },
                    employment_insurance: Enrollment::NotEnrolled {
                        reason: "under 20 hours".to_string(),
                    },
                },
                staff,
                staff_contract,
                client_contract,
                staff_category: category("Picking"),
                client_category: category("Warehouse"),
                employment_type: EmploymentType {
                    id: Uuid::new_v4(),
                    name: "Fixed-term dispatch".to_string(),
                    is_fixed_term: true,
                },
                wage: MinimumWage {
                    prefecture: "東京都".to_string(),
                    hourly_wage: Decimal::new(1072, 0),
                },
            }
        }

        fn ctx(&self) -> AssignmentContext<'_> {
            AssignmentContext {
                staff: &self.staff,
                staff_contract: &self.staff_contract,
                client_contract: &self.client_contract,
                staff_job_category: Some(&self.staff_category),
                client_job_category: Some(&self.client_category),
                employment_type: Some(&self.employment_type),
                payroll: Some(&self.payroll),
                minimum_wage: Some(&self.wage),
                transition: None,
            }
        }

        fn make_foreign(&mut self, period_to: NaiveDate) {
            self.staff.foreign_resident = Some(ForeignResident {
                residence_status: "Specified Skilled Worker (i)".to_string(),
                residence_period_to: period_to,
            });
        }
    }

    fn codes(report: &ValidationReport) -> Vec<FindingCode> {
        report.findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_daily_dispatch_warning() {
        let fixture = Fixture::new();
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert_eq!(codes(&report), vec![FindingCode::DailyDispatch]);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_daily_dispatch_exempt_for_seirei_job() {
        let mut fixture = Fixture::new();
        fixture.client_category.seirei = Some("No. 5 filing".to_string());
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(!report.contains(FindingCode::DailyDispatch));
    }

    #[test]
    fn test_daily_dispatch_exempt_at_60_on_start() {
        let mut fixture = Fixture::new();
        fixture.staff.date_of_birth = Some(date(1963, 4, 1));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(!report.contains(FindingCode::DailyDispatch));
    }

    #[test]
    fn test_daily_dispatch_unknown_birth_is_under_60() {
        let mut fixture = Fixture::new();
        fixture.staff.date_of_birth = None;
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(report.contains(FindingCode::DailyDispatch));
    }

    #[test]
    fn test_daily_dispatch_skipped_for_long_or_limited_contract() {
        let mut fixture = Fixture::new();
        fixture.client_contract.end_date = Some(date(2023, 5, 1));
        assert!(!validate_assignment(&fixture.ctx(), ValidationMode::CollectAll).contains(FindingCode::DailyDispatch));

        let mut fixture = Fixture::new();
        fixture.client_contract.limitation = Some(LimitationFlag::Limited);
        assert!(!validate_assignment(&fixture.ctx(), ValidationMode::CollectAll).contains(FindingCode::DailyDispatch));
    }

    #[test]
    fn test_below_minimum_wage_is_error() {
        let mut fixture = Fixture::new();
        fixture.staff_contract.pay_amount = Some(Decimal::new(1000, 0));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(report.contains(FindingCode::BelowMinimumWage));
        assert!(report.has_errors());
    }

    #[test]
    fn test_minimum_wage_only_for_hourly_pay() {
        let mut fixture = Fixture::new();
        fixture.staff_contract.pay_unit = Some(PayUnit::Daily);
        fixture.staff_contract.pay_amount = Some(Decimal::new(1000, 0));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(!report.contains(FindingCode::BelowMinimumWage));
    }

    #[test]
    fn test_foreign_resident_rules_collect_all() {
        let mut fixture = Fixture::new();
        fixture.make_foreign(date(2023, 4, 10));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert_eq!(
            codes(&report)[..3],
            [
                FindingCode::ResidencePeriodExceeded,
                FindingCode::NotSpecifiedSkilledCategory,
                FindingCode::NotAgricultureFisheryCategory,
            ]
        );
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let mut fixture = Fixture::new();
        fixture.make_foreign(date(2023, 4, 10));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::FailFast);
        assert_eq!(codes(&report), vec![FindingCode::ResidencePeriodExceeded]);
    }

    #[test]
    fn test_foreign_resident_with_qualifying_category_passes() {
        let mut fixture = Fixture::new();
        fixture.make_foreign(date(2025, 1, 1));
        fixture.staff_category.is_specified_skilled_worker = true;
        fixture.staff_category.is_agriculture_fishery_dispatch = true;
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_agriculture_rule_skipped_for_non_dispatch() {
        let mut fixture = Fixture::new();
        fixture.make_foreign(date(2025, 1, 1));
        fixture.staff_category.is_specified_skilled_worker = true;
        fixture.client_contract.contract_type = ContractType::Other;
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(!report.contains(FindingCode::NotAgricultureFisheryCategory));
    }

    #[test]
    fn test_payroll_checked_only_on_transition() {
        let mut fixture = Fixture::new();
        fixture.payroll.welfare_pension = Enrollment::Unset;
        assert!(!validate_assignment(&fixture.ctx(), ValidationMode::CollectAll).contains(FindingCode::PayrollIncomplete));

        let mut ctx = fixture.ctx();
        ctx.transition = Some(ContractStatus::Pending);
        let report = validate_assignment(&ctx, ValidationMode::CollectAll);
        let finding = report
            .findings
            .iter()
            .find(|f| f.code == FindingCode::PayrollIncomplete)
            .unwrap();
        assert!(finding.message.contains("welfare pension"));
    }

    #[test]
    fn test_margin_reported_and_warned_when_non_positive() {
        let mut fixture = Fixture::new();
        assert_eq!(
            validate_assignment(&fixture.ctx(), ValidationMode::CollectAll)
                .profit_margin
                .unwrap()
                .percent(),
            Decimal::new(3333, 2)
        );

        fixture.client_contract.bill_amount = Some(Decimal::new(1200, 0));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(report.contains(FindingCode::NonPositiveProfitMargin));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_contract_period_against_hire_and_resignation() {
        let mut fixture = Fixture::new();
        fixture.staff.hire_date = Some(date(2023, 4, 2));
        fixture.staff.resignation_date = Some(date(2023, 4, 15));
        let report = validate_assignment(&fixture.ctx(), ValidationMode::CollectAll);
        assert!(report.contains(FindingCode::ContractBeforeHireDate));
        assert!(report.contains(FindingCode::ContractAfterResignation));
    }
}
