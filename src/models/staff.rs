//! Staff identity and the master records the validator consults.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a staff member.
pub type StaffId = Uuid;

/// Residence details carried only by foreign-resident staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignResident {
    /// Status of residence (e.g. "specified skilled worker (i)").
    pub residence_status: String,
    /// Last day of the permitted period of stay.
    pub residence_period_to: NaiveDate,
}

/// A staff member.
///
/// # Example
///
/// ```
/// use kintai_engine::models::Staff;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let staff = Staff {
///     id: Uuid::new_v4(),
///     surname: "Sato".to_string(),
///     given_name: "Hana".to_string(),
///     date_of_birth: NaiveDate::from_ymd_opt(1964, 5, 10),
///     hire_date: None,
///     resignation_date: None,
///     foreign_resident: None,
/// };
/// let on = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
/// assert_eq!(staff.age_on(on), Some(59));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Unique identifier.
    pub id: StaffId,
    /// Family name.
    pub surname: String,
    /// Given name.
    pub given_name: String,
    /// Date of birth, when known.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Hire date, when known.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Resignation date, when the staff member has left or is leaving.
    #[serde(default)]
    pub resignation_date: Option<NaiveDate>,
    /// Present only for foreign residents.
    #[serde(default)]
    pub foreign_resident: Option<ForeignResident>,
}

impl Staff {
    /// Full name for messages.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.surname, self.given_name)
    }

    /// Age in completed years on the given date, or `None` without a birth date.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.date_of_birth?;
        let mut age = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

/// Enrollment state of one social-insurance scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Enrollment {
    /// Nothing recorded yet.
    Unset,
    /// Enrolled on the given date.
    Enrolled {
        /// Date of enrollment.
        join_date: NaiveDate,
    },
    /// Deliberately not enrolled.
    NotEnrolled {
        /// The recorded reason for non-enrollment.
        reason: String,
    },
}

impl Enrollment {
    /// Whether the scheme has an enrollment date or a non-enrollment reason.
    pub fn is_recorded(&self) -> bool {
        match self {
            Enrollment::Unset => false,
            Enrollment::Enrolled { .. } => true,
            Enrollment::NotEnrolled { reason } => !reason.trim().is_empty(),
        }
    }
}

/// Payroll-related insurance records of a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffPayroll {
    /// The staff member these records belong to.
    pub staff_id: StaffId,
    /// Health insurance.
    pub health_insurance: Enrollment,
    /// Welfare pension.
    pub welfare_pension: Enrollment,
    /// Employment insurance.
    pub employment_insurance: Enrollment,
}

impl StaffPayroll {
    /// Names of the schemes with nothing recorded.
    pub fn missing_schemes(&self) -> Vec<&'static str> {
        [
            ("health insurance", &self.health_insurance),
            ("welfare pension", &self.welfare_pension),
            ("employment insurance", &self.employment_insurance),
        ]
        .into_iter()
        .filter(|(_, enrollment)| !enrollment.is_recorded())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Employment type master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentType {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Fixed-term (as opposed to indefinite-term) employment.
    pub is_fixed_term: bool,
}

/// Job category master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCategory {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The category qualifies for specified-skilled-worker residents.
    #[serde(default)]
    pub is_specified_skilled_worker: bool,
    /// The category is dispatch into agriculture or fishery.
    #[serde(default)]
    pub is_agriculture_fishery_dispatch: bool,
    /// "Seirei" classification exempting the job from the daily-dispatch ban.
    #[serde(default)]
    pub seirei: Option<String>,
}

impl JobCategory {
    /// Whether a Seirei classification is recorded.
    pub fn has_seirei(&self) -> bool {
        self.seirei.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staff_born(dob: Option<NaiveDate>) -> Staff {
        Staff {
            id: Uuid::new_v4(),
            surname: "Tanaka".to_string(),
            given_name: "Jun".to_string(),
            date_of_birth: dob,
            hire_date: None,
            resignation_date: None,
            foreign_resident: None,
        }
    }

    #[test]
    fn test_age_turns_on_birthday() {
        let staff = staff_born(Some(date(1964, 5, 10)));
        assert_eq!(staff.age_on(date(2024, 5, 9)), Some(59));
        assert_eq!(staff.age_on(date(2024, 5, 10)), Some(60));
    }

    #[test]
    fn test_age_unknown_without_birth_date() {
        assert_eq!(staff_born(None).age_on(date(2024, 1, 1)), None);
    }

    #[test]
    fn test_payroll_missing_schemes() {
        let payroll = StaffPayroll {
            staff_id: Uuid::new_v4(),
            health_insurance: Enrollment::Enrolled {
                join_date: date(2023, 4, 1),
            },
            welfare_pension: Enrollment::NotEnrolled {
                reason: "  ".to_string(),
            },
            employment_insurance: Enrollment::Unset,
        };
        assert_eq!(
            payroll.missing_schemes(),
            vec!["welfare pension", "employment insurance"]
        );
    }

    #[test]
    fn test_job_category_blank_seirei_is_absent() {
        let category = JobCategory {
            id: Uuid::new_v4(),
            name: "Warehouse".to_string(),
            is_specified_skilled_worker: false,
            is_agriculture_fishery_dispatch: false,
            seirei: Some(" ".to_string()),
        };
        assert!(!category.has_seirei());
    }
}
