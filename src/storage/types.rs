use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::KeyValueStore;

/// Holds the string `"true"` while a user is logged in, absent otherwise.
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
/// Serialized `UserProfile` of the logged-in user.
pub const USER_KEY: &str = "user";
/// Serialized list of every `VisitorRecord`, oldest first.
pub const VISITORS_KEY: &str = "visitors";

/// Reads `key` and decodes it as JSON.
///
/// A value that does not decode is reported as `StorageError::CorruptValue`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
            warn!("Value under '{}' does not decode: {}", key, e);
            StorageError::CorruptValue(key.to_string())
        }),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|_| StorageError::WriteFailed)?;
    store.set(key, &raw)
}
