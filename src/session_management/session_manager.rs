use crate::configuration::AccountConfig;
use crate::error_handling::types::{AuthError, StorageError};
use crate::session_management::session::{Session, UserProfile};
use crate::storage::types::{read_json, write_json, IS_AUTHENTICATED_KEY, USER_KEY};
use crate::storage::KeyValueStore;
use log::{debug, info, warn};
use std::sync::Arc;

const AUTHENTICATED_FLAG: &str = "true";

/// The structure related to session management
///
/// Holds the accounts accepted by the login gate and the store the session
/// is persisted in. There is a single session per store: logging in as
/// another account replaces it, and there is no expiry.
///
/// # Fields Overview
///
/// - `store`: where `isAuthenticated` and `user` are written
/// - `accounts`: configured username/password pairs, compared verbatim
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    accounts: Vec<AccountConfig>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, accounts: Vec<AccountConfig>) -> Self {
        Self { store, accounts }
    }

    /// Checks the credential pair and, on a match, persists the session.
    ///
    /// A failed attempt leaves the store untouched.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .ok_or_else(|| {
                warn!("Rejected login attempt for '{}'", username);
                AuthError::InvalidCredentials
            })?;

        let user = UserProfile {
            username: account.username.clone(),
            role: account.role,
            ministry: account.ministry.clone(),
        };

        // profile first: the flag must never point at a missing profile
        write_json(self.store.as_ref(), USER_KEY, &user)?;
        self.store.set(IS_AUTHENTICATED_KEY, AUTHENTICATED_FLAG)?;

        info!("User '{}' logged in as {}", user.username, user.role);
        Ok(Session::new(user))
    }

    /// Clears both the flag and the profile.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(IS_AUTHENTICATED_KEY)?;
        self.store.remove(USER_KEY)?;
        info!("Session cleared");
        Ok(())
    }

    /// Reads the persisted session.
    ///
    /// Returns `None` when the flag is absent or not `"true"`, and when the
    /// stored profile is missing or unreadable.
    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        match self.store.get(IS_AUTHENTICATED_KEY)? {
            Some(flag) if flag == AUTHENTICATED_FLAG => {}
            _ => {
                debug!("No authenticated session");
                return Ok(None);
            }
        }

        match read_json::<UserProfile>(self.store.as_ref(), USER_KEY) {
            Ok(Some(user)) => Ok(Some(Session::new(user))),
            Ok(None) => {
                warn!("Authenticated flag set without a user profile");
                Ok(None)
            }
            Err(StorageError::CorruptValue(_)) => {
                warn!("Stored user profile is unreadable, treating as logged out");
                Ok(None)
            }
            Err(e) => Err(AuthError::StorageError(e)),
        }
    }

    /// Gate for protected views.
    pub fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session()?.ok_or(AuthError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::Role;
    use crate::storage::memory_storage::MemoryStorage;

    fn manager() -> (Arc<MemoryStorage>, SessionManager) {
        let store = Arc::new(MemoryStorage::new());
        let manager = SessionManager::new(store.clone(), vec![AccountConfig::default()]);
        (store, manager)
    }

    #[test]
    fn test_login_with_valid_credentials() {
        let (store, manager) = manager();
        let session = manager.login("guard", "admin123").unwrap();
        assert!(session.authenticated);
        assert_eq!(session.user.username, "guard");
        assert_eq!(session.user.role, Role::Guard);

        assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap().as_deref(), Some("true"));
        let raw_user = store.get(USER_KEY).unwrap().unwrap();
        assert!(raw_user.contains("\"role\":\"security_guard\""));
        assert_eq!(manager.current_session().unwrap(), Some(session));
    }

    #[test]
    fn test_login_with_wrong_pair_leaves_flag_unset() {
        let (store, manager) = manager();
        for (user, pass) in [("guard", "wrong"), ("admin", "mepd2024"), ("Guard", "admin123")] {
            assert!(matches!(
                manager.login(user, pass),
                Err(AuthError::InvalidCredentials)
            ));
        }
        assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert!(manager.current_session().unwrap().is_none());
    }

    #[test]
    fn test_login_with_blank_fields() {
        let (_store, manager) = manager();
        assert!(matches!(manager.login("", "admin123"), Err(AuthError::MissingCredentials)));
        assert!(matches!(manager.login("guard", ""), Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_logout_clears_flag_and_profile() {
        let (store, manager) = manager();
        manager.login("guard", "admin123").unwrap();
        manager.logout().unwrap();
        assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert!(matches!(
            manager.require_session(),
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_flag_without_profile_is_not_a_session() {
        let (store, manager) = manager();
        store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
        assert!(manager.current_session().unwrap().is_none());

        store.set(USER_KEY, "{broken").unwrap();
        assert!(manager.current_session().unwrap().is_none());
    }

    #[test]
    fn test_reads_profile_written_by_browser_client() {
        let (store, manager) = manager();
        store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
        store
            .set(USER_KEY, r#"{"username":"guard","role":"security_guard"}"#)
            .unwrap();
        let session = manager.require_session().unwrap();
        assert_eq!(session.user.role, Role::Guard);
        assert_eq!(session.user.ministry, None);
    }
}
