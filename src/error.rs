//! Error types for the time & attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the engine reports: bad time spans, misconfigured
//! calculation policies, forbidden lifecycle transitions, blocking
//! validation findings and storage failures.

use thiserror::Error;

use crate::validation::Finding;

/// The main error type for the engine.
///
/// All operations in the engine return this error type, so callers can
/// roll back their storage transaction on any variant.
///
/// # Example
///
/// ```
/// use kintai_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/tenant.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/tenant.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A time span resolved to a negative or otherwise unusable length.
    #[error("Invalid interval: {message}")]
    InvalidInterval {
        /// A description of what made the interval invalid.
        message: String,
    },

    /// A time-card's inputs are inconsistent with its work type or dates.
    #[error("Invalid time-card for {date}: {message}")]
    InvalidTimeCard {
        /// The card's work date.
        date: String,
        /// What is wrong with it.
        message: String,
    },

    /// A calculation policy cannot be used to aggregate a month.
    #[error("Overtime pattern '{policy}' is misconfigured: {message}")]
    PolicyMisconfigured {
        /// Name or id of the offending policy.
        policy: String,
        /// What is wrong with it.
        message: String,
    },

    /// A lifecycle transition was rejected; nothing was mutated.
    #[error("Cannot move {entity} from {from} to {to}: {reason}")]
    StateTransitionForbidden {
        /// The kind of entity (e.g. "staff contract").
        entity: String,
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },

    /// Assignment validation produced at least one error finding.
    #[error("Validation failed with {} finding(s)", findings.len())]
    ValidationFailed {
        /// Every finding reported, warnings included.
        findings: Vec<Finding>,
    },

    /// A monthly time-sheet is not open for edits.
    #[error("Time-sheet {month} is not editable (status: {status})")]
    SheetNotEditable {
        /// The year-month of the sheet.
        month: String,
        /// Its current status.
        status: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The storage port failed; surfaced unchanged so callers can roll back.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInterval`].
    pub fn invalid_interval(message: impl Into<String>) -> Self {
        EngineError::InvalidInterval {
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidTimeCard`].
    pub fn invalid_card(date: chrono::NaiveDate, message: impl Into<String>) -> Self {
        EngineError::InvalidTimeCard {
            date: date.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
