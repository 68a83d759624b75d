//! Time & attendance calculation engine for staffing-agency dispatch contracts.
//!
//! This crate turns raw time-cards into payroll-ready daily and monthly
//! figures under four overtime regimes, validates staff-to-client
//! assignments against labour and immigration rules, and drives the
//! contract issuance lifecycle that decides which inputs are still editable.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod repository;
pub mod validation;
