//! Storage Layer
//!
//! Persists violation records produced by field recording and self-checks.
//! Two backends sit behind one [`Repository`]: an in-memory store for
//! development and tests, and SQLite via sqlx.

mod record;
mod repository;
mod sqlite;

pub use record::{
    NewViolationRecord, PaymentStatus, RecordFilter, RecordStatus, VehicleCount, ViolationRecord,
    ViolationStats,
};
pub use repository::{MemoryRepository, Repository};
pub use sqlite::SqliteRepository;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    Memory,

    /// SQLite database
    Sqlite {
        /// Connection URL, e.g. `sqlite://traffic_system.db`
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

fn default_pool_size() -> u32 {
    5
}
