//! Storage subsystem
//!
//! All persistent state lives in one string key-value store, the server-side
//! counterpart of browser local storage. Three keys are in use:
//! `isAuthenticated`, `user` and `visitors` (see [`types`]).
//!
//! Components:
//! - `storage_trait`: the `KeyValueStore` trait every backend implements.
//! - `types`: the reserved keys and JSON helpers shared by the services.
//! - `memory_storage`: process-local map, used by tests and throwaway runs.
//! - `file_storage`: a single JSON document on disk, rewritten on every change.
//! - `database_storage`: SQLite table driven through SeaORM.
//! - `db_entities`: SeaORM entity model for the database backend.

pub mod database_storage;
pub mod db_entities;
pub mod file_storage;
pub mod memory_storage;
pub mod storage_trait;
pub mod types;

pub use storage_trait::KeyValueStore;
