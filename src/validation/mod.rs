//! Business rules gating assignments and contract transitions.
//!
//! The rules are pure functions over records the caller has loaded. They
//! return [`Finding`]s; error findings block persistence and warnings are
//! passed back to the caller.

mod assignment;
mod conflict_date;
mod findings;
mod minimum_wage;
mod profit_margin;

pub use assignment::{
    AssignmentContext, DAILY_DISPATCH_EXEMPT_AGE, DAILY_DISPATCH_MAX_DAYS, ValidationMode,
    validate_assignment,
};
pub use conflict_date::{
    CONFLICT_PERIOD_MONTHS, COOLING_OFF_MONTHS, ConflictDate, conflict_date, dispatch_start_date,
};
pub use findings::{Finding, FindingCode, Severity, ValidationReport};
pub use minimum_wage::{MinimumWage, MinimumWageRow, MinimumWageTable, parse_prefecture};
pub use profit_margin::{ProfitMargin, profit_margin};
