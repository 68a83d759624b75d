//! Configuration loading for a tenant of the time & attendance engine.
//!
//! This module loads tenant settings, minimum wages and calculation
//! policies from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use kintai_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded tenant: {}", config.tenant().display_name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{KintaiConfig, MinimumWagesConfig, PoliciesConfig, TenantConfig};
