//! Core data models for the time & attendance engine.
//!
//! This module contains the domain records the engine loads through the
//! repository port and writes back after a recompute.

mod assignment;
mod audit;
mod clock;
mod contract;
mod staff;
mod timesheet;
mod worktime;

pub use assignment::{Assignment, AssignmentId, AssignmentPeriod, PrintHistoryRecord};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use clock::{TimeOfDay, YearMonth, format_minutes};
pub use contract::{
    ClientContract, ContractId, ContractStatus, ContractType, LimitationFlag, PayUnit,
    StaffContract,
};
pub use staff::{
    EmploymentType, Enrollment, ForeignResident, JobCategory, Staff, StaffId, StaffPayroll,
};
pub use timesheet::{
    DailyId, DailyTimeCard, MonthId, MonthlyApproval, MonthlyTimeSheet, MonthlyTotals,
    PunchedBreak, SheetStatus, TimeRecord, WorkType,
};
pub use worktime::{BreakSlot, WorkSlot, WorkTimePattern};
