//! State machines controlling what downstream inputs are editable.
//!
//! - [`staff_contract`]: draft → pending → approved → issued → confirmed,
//!   with un-issue and revoke cascades onto assignments
//! - [`employment_conditions`]: per-assignment document issuance and staff
//!   confirmation, keyed by the contract number
//! - [`timesheet`]: submit / approve / reject / reopen of monthly sheets and
//!   approval envelopes

pub mod employment_conditions;
pub mod staff_contract;
pub mod timesheet;

pub use employment_conditions::Issuance;
pub use timesheet::SheetAction;
