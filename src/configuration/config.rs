use super::types::*;
use crate::error_handling::types::ConfigError;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable overriding `storage.path` when set.
pub const STORAGE_PATH_ENV: &str = "VMS_STORAGE_PATH";

fn badge_prefix_pattern() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9-]{0,9}$").expect("static regex"))
}

/// Application configuration structure that defines all runtime parameters.
///
/// This structure holds the complete configuration for the reception desk:
/// where the key-value store lives, which accounts may log in, the department
/// directory used to derive floors, badge settings and the sample-report knobs.
/// Every section falls back to its default when absent from the TOML file, so an
/// empty file yields the canonical single-guard, six-department setup.
///
/// # Examples
///
/// ```
/// use vms::configuration::Config;
///
/// let config = Config::from_toml_str("[web]\nport = 9090\n").unwrap();
/// assert_eq!(config.web.port, 9090);
/// assert_eq!(config.departments.len(), 6);
/// ```
///
/// # Fields Overview
///
/// - `storage`: key-value store backend and its location
/// - `web`: address and port for the HTTP interface
/// - `auth`: accounts accepted by the login gate and the simulated round trip
/// - `registration`: registration-code prefix and simulated round trip
/// - `reports`: seed and jitter for the generated chart data
/// - `departments`: department to floor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub web: WebConfig,
    pub auth: AuthConfig,
    pub registration: RegistrationConfig,
    pub reports: ReportsConfig,
    pub departments: Vec<DepartmentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            web: WebConfig::default(),
            auth: AuthConfig::default(),
            registration: RegistrationConfig::default(),
            reports: ReportsConfig::default(),
            departments: default_departments(),
        }
    }
}

impl Config {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// `ConfigError::IoError` when the file cannot be read, `ConfigError::TomlError` when it
    /// is not valid TOML for this model, or any validation error from [`Config::validate`].
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        info!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        debug!(
            "Configuration loaded: {} department(s), {} account(s), backend {:?}",
            config.departments.len(),
            config.auth.accounts.len(),
            config.storage.backend
        );
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(STORAGE_PATH_ENV) {
            if !path.trim().is_empty() {
                info!("Using storage path from {}: {}", STORAGE_PATH_ENV, path);
                self.storage.path = PathBuf::from(path);
            }
        }
    }

    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.departments.is_empty() {
            return Err(ConfigError::DepartmentsEmpty(
                "at least one department is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for dept in &self.departments {
            if dept.name.trim().is_empty() {
                return Err(ConfigError::DepartmentsEmpty(
                    "department names must not be blank".to_string(),
                ));
            }
            if !seen.insert(dept.name.as_str()) {
                return Err(ConfigError::DuplicateDepartment(dept.name.clone()));
            }
        }

        if self.auth.accounts.is_empty() {
            return Err(ConfigError::AccountsEmpty(
                "at least one account is required".to_string(),
            ));
        }
        let mut usernames = HashSet::new();
        for account in &self.auth.accounts {
            if account.username.trim().is_empty() || account.password.is_empty() {
                return Err(ConfigError::AccountsEmpty(
                    "accounts need a username and a password".to_string(),
                ));
            }
            if !usernames.insert(account.username.as_str()) {
                return Err(ConfigError::AccountsEmpty(format!(
                    "username '{}' is declared twice",
                    account.username
                )));
            }
        }

        if !badge_prefix_pattern().is_match(&self.registration.badge_prefix) {
            return Err(ConfigError::BadBadgePrefix(format!(
                "'{}' must be 1-10 uppercase letters, digits or '-', starting with a letter",
                self.registration.badge_prefix
            )));
        }

        if self.reports.jitter_percent > 100 {
            return Err(ConfigError::NotInRange(format!(
                "reports.jitter_percent = {} (expected 0-100)",
                self.reports.jitter_percent
            )));
        }

        Ok(())
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.auth.simulated_latency_ms)
    }

    pub fn registration_latency(&self) -> Duration {
        Duration::from_millis(self.registration.simulated_latency_ms)
    }
}
