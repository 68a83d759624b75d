//! HTTP API module for the time & attendance engine.
//!
//! This module exposes the engine's operations as JSON endpoints: time-card
//! writes and recomputes, time-sheet status changes, assignment validation
//! and the contract issuance lifecycle.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ActorRequest, ApprovalRequest, AssignmentRequest, ConflictDateQuery, ContractAction,
    PrefillRequest, TimeCardRequest, TransitionCheckRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
