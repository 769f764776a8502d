//! Session management core module.
//!
//! This module provides the login gate: the account role model, the
//! persisted session shape and the `SessionManager` that writes, reads and
//! clears it in the key-value store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Submodule for session data structures.
pub mod session;
/// Submodule for the session manager implementation.
pub mod session_manager;

pub use session::{Session, UserProfile};
pub use session_manager::SessionManager;

/// Role of a front-desk account.
///
/// Variants:
/// - `Guard`: reception security guard, persisted as `security_guard`.
/// - `Admin`: ministry administrator, persisted as `admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "security_guard", alias = "guard")]
    Guard,
    #[serde(rename = "admin")]
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Guard => write!(f, "guard"),
            Role::Admin => write!(f, "admin"),
        }
    }
}
