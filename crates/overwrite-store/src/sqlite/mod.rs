//! SQLite-backed, read-only source of overwrite rows.

mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use overwrite_core::{OverwriteAction, RawOverwriteRule};
use rusqlite::Connection;
use serde_json::Value;

use crate::error::RuleStoreError;
use crate::rule_store::{Result, RuleStore};

pub use schema::CREATE_TABLES;

/// Error type for opening the overwrite database.
#[derive(Debug, thiserror::Error)]
pub enum RuleDbError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct RuleDb {
    conn: Mutex<Connection>,
}

impl RuleDb {
    pub fn new(path: impl AsRef<Path>) -> std::result::Result<Self, RuleDbError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute_batch(schema::CREATE_TABLES)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> std::result::Result<Self, RuleDbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::CREATE_TABLES)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[derive(Clone)]
pub struct SqliteRuleStore {
    db: Arc<RuleDb>,
}

impl SqliteRuleStore {
    pub fn new(db: Arc<RuleDb>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<RuleDb> {
        &self.db
    }
}

#[async_trait]
impl RuleStore for SqliteRuleStore {
    async fn list_active_rules(&self, scope_id: &str, command: &str) -> Result<Vec<RawOverwriteRule>> {
        let db = self.db.clone();
        let scope_id = scope_id.to_string();
        let command = command.to_string();

        tokio::task::spawn_blocking(move || query_active_rules(&db, &scope_id, &command))
            .await
            .map_err(|err| RuleStoreError::Task(err.to_string()))?
    }
}

fn query_active_rules(db: &RuleDb, scope_id: &str, command: &str) -> Result<Vec<RawOverwriteRule>> {
    let conn = db.lock_conn();
    let mut stmt = conn.prepare(
        r#"
SELECT id, scope_id, commands_json, on_match, disabled,
       required_channels_json, required_roles_json, required_permissions_json,
       required_system_permissions_json, required_users_json, required_level
FROM command_permission_overwrites
WHERE scope_id = ?1
  AND disabled = 0
  AND EXISTS (
      SELECT 1 FROM json_each(command_permission_overwrites.commands_json)
      WHERE json_each.value = ?2
  )
ORDER BY id ASC
        "#,
    )?;

    let mut rows = stmt.query(rusqlite::params![scope_id, command])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let scope_id: String = row.get(1)?;
        let commands_json: String = row.get(2)?;
        let on_match: String = row.get(3)?;
        let disabled: i64 = row.get(4)?;
        let required_channels: Option<String> = row.get(5)?;
        let required_roles: Option<String> = row.get(6)?;
        let required_permissions: Option<String> = row.get(7)?;
        let required_system_permissions: Option<String> = row.get(8)?;
        let required_users: Option<String> = row.get(9)?;
        let required_level: Option<i32> = row.get(10)?;

        let commands: Vec<String> = serde_json::from_str(&commands_json)?;
        let on_match = on_match
            .parse::<OverwriteAction>()
            .map_err(|message| RuleStoreError::InvalidRow { id, message })?;

        out.push(RawOverwriteRule {
            id,
            scope_id,
            commands,
            on_match,
            disabled: disabled != 0,
            required_channels: json_column(id, "required_channels_json", required_channels),
            required_roles: json_column(id, "required_roles_json", required_roles),
            required_permissions: json_column(id, "required_permissions_json", required_permissions),
            required_system_permissions: json_column(
                id,
                "required_system_permissions_json",
                required_system_permissions,
            ),
            required_users: json_column(id, "required_users_json", required_users),
            required_level,
        });
    }

    Ok(out)
}

/// Requirement columns that are not valid JSON are passed through as a
/// string so normalization rejects that one row.
fn json_column(id: i64, column: &str, raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(rule_id = id, column, error = %err, "Overwrite column is not valid JSON");
            Some(Value::String(raw))
        }
    }
}
