//! Runtime configuration: TOML file model, defaults and validation.

pub mod config;
pub mod types;

pub use config::Config;
pub use types::{
    AccountConfig, AuthConfig, DepartmentConfig, RegistrationConfig, ReportsConfig,
    StorageBackend, StorageConfig, WebConfig,
};
