//! Key-Value Store Trait
//!
//! This module defines the `KeyValueStore` trait, the only persistence seam of
//! the application. Services receive it as an `Arc<dyn KeyValueStore>` so tests
//! can run against an in-memory map instead of a real file or database.
//!
//! Values are opaque strings; structured data is stored as JSON by the callers
//! (see [`crate::storage::types`]).

use crate::error_handling::types::StorageError;

/// The `KeyValueStore` trait defines the interface for storage backends.
///
/// Implementations must be safe to share across threads. A freshly created
/// store over a new location is empty: no session and an empty ledger.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Removes every key.
    fn clear(&self) -> Result<(), StorageError>;
}
