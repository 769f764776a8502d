use serde::{Deserialize, Serialize};

use crate::session_management::Role;

/// Profile of the logged-in account, stored under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ministry: Option<String>,
}

/// The authenticated-user marker and profile.
///
/// Only constructed for an authenticated user; the unauthenticated state is
/// represented by the absence of a `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub user: UserProfile,
}

impl Session {
    pub fn new(user: UserProfile) -> Self {
        Self {
            authenticated: true,
            user,
        }
    }
}
