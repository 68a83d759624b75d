//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a tenant's
//! configuration from YAML files and seeding a repository with it.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::engine::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::repository::InMemoryRepository;

use super::types::{KintaiConfig, MinimumWagesConfig, PoliciesConfig, TenantConfig};

/// Loads and provides access to a tenant configuration.
///
/// The `ConfigLoader` reads YAML files from a directory, checks every
/// policy for range errors and hands out the settings the engine runs with.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── tenant.yaml          # Tenant id, number prefix, offset, prefectures
/// ├── minimum_wages.yaml   # Hourly minimum wage revisions per prefecture
/// └── policies.yaml        # Overtime patterns, time punches, work-time patterns
/// ```
///
/// # Example
///
/// ```no_run
/// use kintai_engine::config::ConfigLoader;
/// use kintai_engine::repository::InMemoryRepository;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let repo = InMemoryRepository::new();
/// loader.seed(&repo).unwrap();
/// let settings = loader.engine_settings().unwrap();
/// println!("Tenant: {}", settings.tenant_id);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: KintaiConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `tenant.yaml` is missing (the other files are optional)
    /// - Any file contains invalid YAML
    /// - A policy fails its range checks
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let tenant = Self::load_yaml::<TenantConfig>(&path.join("tenant.yaml"))?;
        let minimum_wages = Self::load_optional::<MinimumWagesConfig>(
            &path.join("minimum_wages.yaml"),
        )?
        .unwrap_or(MinimumWagesConfig {
            minimum_wages: Vec::new(),
        });
        let policies =
            Self::load_optional::<PoliciesConfig>(&path.join("policies.yaml"))?.unwrap_or_default();

        let config = KintaiConfig::new(tenant, minimum_wages, policies);
        Self::check_policies(&config.policies)?;

        info!(
            tenant_id = %config.tenant.tenant_id,
            overtime_patterns = config.policies.overtime_patterns.len(),
            time_punches = config.policies.time_punches.len(),
            minimum_wage_rows = config.minimum_wages.rows.len(),
            "Configuration loaded"
        );
        Ok(Self { config })
    }

    /// Builds a loader from configuration already in memory.
    pub fn from_config(config: KintaiConfig) -> EngineResult<Self> {
        Self::check_policies(&config.policies)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn load_optional<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
        if !path.exists() {
            debug!(path = %path.display(), "Optional configuration file absent");
            return Ok(None);
        }
        Self::load_yaml(path).map(Some)
    }

    fn check_policies(policies: &PoliciesConfig) -> EngineResult<()> {
        for pattern in &policies.overtime_patterns {
            pattern.validate()?;
        }
        for punch in &policies.time_punches {
            punch.validate()?;
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &KintaiConfig {
        &self.config
    }

    /// Returns the tenant section.
    pub fn tenant(&self) -> &TenantConfig {
        &self.config.tenant
    }

    /// Settings for an [`Engine`](crate::engine::Engine) serving this tenant.
    ///
    /// Fails when the configured UTC offset is out of range.
    pub fn engine_settings(&self) -> EngineResult<EngineSettings> {
        let tenant = &self.config.tenant;
        let mut settings = EngineSettings::new(tenant.tenant_id.clone(), tenant.utc_offset_hours)?;
        settings.contract_number_prefix = tenant.contract_number_prefix.clone();
        settings.validation_mode = tenant.validation_mode;
        settings.prefectures = tenant.prefectures.clone();
        Ok(settings)
    }

    /// Copies policies, templates and minimum wages into a repository.
    pub fn seed(&self, repo: &InMemoryRepository) -> EngineResult<()> {
        let policies = &self.config.policies;
        for pattern in &policies.overtime_patterns {
            repo.insert_policy(pattern.clone())?;
        }
        for punch in &policies.time_punches {
            repo.insert_time_punch(punch.clone())?;
        }
        for pattern in &policies.worktime_patterns {
            repo.insert_worktime_pattern(pattern.clone())?;
        }
        repo.set_minimum_wages(self.config.minimum_wages.clone())?;
        Ok(())
    }
}
