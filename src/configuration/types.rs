use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session_management::Role;

/// A department visitors can be sent to, and the floor it occupies.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct DepartmentConfig {
    pub name: String,
    pub floor: u8,
}

impl DepartmentConfig {
    pub fn new<S: Into<String>>(name: S, floor: u8) -> Self {
        Self {
            name: name.into(),
            floor,
        }
    }
}

/// Department table used by the registration desk when none is configured.
pub fn default_departments() -> Vec<DepartmentConfig> {
    vec![
        DepartmentConfig::new("Economic Planning", 1),
        DepartmentConfig::new("Development Finance", 2),
        DepartmentConfig::new("Policy Analysis", 3),
        DepartmentConfig::new("Public Service", 4),
        DepartmentConfig::new("Ministry of Finance", 5),
        DepartmentConfig::new("Administration", 6),
    ]
}

/// A front-desk account allowed through the login gate.
///
/// Passwords are compared verbatim. The gate is a placeholder, not a
/// security boundary.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub ministry: Option<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: String::from("guard"),
            password: String::from("admin123"),
            role: Role::Guard,
            ministry: Some(String::from("Ministry of Economic Planning & Development")),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Database,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON file for the `file` backend, SQLite file for `database`.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: PathBuf::from("vms-data/store.json"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("127.0.0.1"),
            port: 8080,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Artificial delay applied before answering a login attempt.
    pub simulated_latency_ms: u64,
    pub accounts: Vec<AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1000,
            accounts: vec![AccountConfig::default()],
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub badge_prefix: String,
    /// Artificial delay applied before answering a registration.
    pub simulated_latency_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            badge_prefix: String::from("REG"),
            simulated_latency_ms: 1500,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Seed for the sample-data perturbation. Unset means a fresh seed per generator.
    pub seed: Option<u64>,
    /// Maximum perturbation applied to each sample count, in percent. 0 keeps the literals.
    pub jitter_percent: u8,
}
