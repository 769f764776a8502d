//! SeaORM entity model used by the database storage backend.
//!
//! The backend keeps the same flat layout as the file store: one row per key
//! in the `kv_entries` table.

use sea_orm::entity::prelude::*;

/// Key-value table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    /// Store key, e.g. `visitors`
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Raw value as written by the caller
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// RFC3339 timestamp of the last write
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
