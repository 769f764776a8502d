use std::env;
use std::path::Path;

use chrono::Utc;
use log::{debug, error, info};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryOrder, Schema,
};

use crate::error_handling::types::StorageError;
use crate::storage::db_entities as kv_entry;
use crate::storage::storage_trait::KeyValueStore;

/// SQLite-backed key-value store.
///
/// The store owns a small current-thread tokio runtime and blocks on it for
/// every call, so it exposes the same synchronous API as the other backends.
/// It must therefore be used from a blocking context (a plain thread or
/// `tokio::task::spawn_blocking`), never directly from async code.
pub struct DatabaseStorage {
    rt: tokio::runtime::Runtime,
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Default database filename used in the application's working directory
    const DEFAULT_DB_FILE: &'static str = "vms.sqlite3";

    /// Create or open the database in the current working directory with the default filename
    pub fn new() -> Result<Self, StorageError> {
        let cwd = env::current_dir().map_err(|_| StorageError::ConnectionFailed)?;
        Self::new_file(cwd.join(Self::DEFAULT_DB_FILE))
    }

    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|_| StorageError::ConnectionFailed)?;
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|_| StorageError::WriteFailed)?;
            }
        }
        let url = format!("sqlite://{}?mode=rwc", path_ref.display());
        let db = rt.block_on(async {
            let mut opts = ConnectOptions::new(url);
            opts.max_connections(5).sqlx_logging(false);
            let db = Database::connect(opts).await.map_err(|e| {
                error!("Failed to open database {}: {}", path_ref.display(), e);
                StorageError::ConnectionFailed
            })?;
            let backend = db.get_database_backend();
            let schema = Schema::new(backend);
            let mut create = schema.create_table_from_entity(kv_entry::Entity);
            create.if_not_exists();
            db.execute(backend.build(&create)).await.map_err(|e| {
                error!("Failed to create kv_entries table: {}", e);
                StorageError::WriteFailed
            })?;
            Ok::<_, StorageError>(db)
        })?;
        info!("DatabaseStorage initialized at {}", path_ref.display());
        Ok(Self { rt, db })
    }
}

impl KeyValueStore for DatabaseStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.rt.block_on(async {
            let row = kv_entry::Entity::find_by_id(key.to_string())
                .one(&self.db)
                .await
                .map_err(|_| StorageError::ReadFailed)?;
            Ok(row.map(|m| m.value))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.rt.block_on(async {
            let entry = kv_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(Utc::now().to_rfc3339()),
            };
            kv_entry::Entity::insert(entry)
                .on_conflict(
                    OnConflict::column(kv_entry::Column::Key)
                        .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| {
                    error!("Failed to write '{}': {}", key, e);
                    StorageError::WriteFailed
                })?;
            debug!("Stored {} byte(s) under '{}'", value.len(), key);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.rt.block_on(async {
            kv_entry::Entity::delete_by_id(key.to_string())
                .exec(&self.db)
                .await
                .map_err(|_| StorageError::WriteFailed)?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.rt.block_on(async {
            let rows = kv_entry::Entity::find()
                .order_by_asc(kv_entry::Column::Key)
                .all(&self.db)
                .await
                .map_err(|_| StorageError::ReadFailed)?;
            Ok(rows.into_iter().map(|m| m.key).collect())
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.rt.block_on(async {
            let res = kv_entry::Entity::delete_many()
                .exec(&self.db)
                .await
                .map_err(|_| StorageError::WriteFailed)?;
            info!("Cleared {} row(s) from kv_entries", res.rows_affected);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, DatabaseStorage) {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        let storage = DatabaseStorage::new_file(path).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_db_set_get_overwrite() {
        let (_dir, storage) = temp_db();
        assert_eq!(storage.get("user").unwrap(), None);
        storage.set("user", "first").unwrap();
        storage.set("user", "second").unwrap();
        assert_eq!(storage.get("user").unwrap().as_deref(), Some("second"));
        assert_eq!(storage.keys().unwrap(), vec!["user"]);
    }

    #[test]
    fn test_db_remove_and_clear() {
        let (_dir, storage) = temp_db();
        storage.set("isAuthenticated", "true").unwrap();
        storage.set("visitors", "[]").unwrap();
        storage.remove("isAuthenticated").unwrap();
        storage.remove("isAuthenticated").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["visitors"]);
        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_db_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reopen.sqlite3");
        {
            let storage = DatabaseStorage::new_file(&path).unwrap();
            storage.set("visitors", "[{\"fullName\":\"A\"}]").unwrap();
        }
        let storage = DatabaseStorage::new_file(&path).unwrap();
        assert_eq!(
            storage.get("visitors").unwrap().as_deref(),
            Some("[{\"fullName\":\"A\"}]")
        );
    }
}
