//! Error types for overwrite-store

use thiserror::Error;

/// Failure reported by a [`crate::RuleStore`] backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RuleStoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid overwrite row {id}: {message}")]
    InvalidRow { id: i64, message: String },
    #[error("rule store task failed: {0}")]
    Task(String),
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`crate::OverwriteCacheStore`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OverwriteCacheError {
    #[error("failed to load overwrites for {command} in scope {scope_id}: {source}")]
    Store {
        scope_id: String,
        command: String,
        #[source]
        source: RuleStoreError,
    },
}

pub type Result<T> = std::result::Result<T, OverwriteCacheError>;
