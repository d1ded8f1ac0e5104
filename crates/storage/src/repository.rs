//! Repository Implementation

use crate::record::{
    NewViolationRecord, PaymentStatus, RecordFilter, VehicleCount, ViolationRecord, ViolationStats,
};
use crate::sqlite::SqliteRepository;
use crate::{StorageConfig, StorageError};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Repository for violation records, backed by memory or SQLite
pub enum Repository {
    Memory(MemoryRepository),
    Sqlite(SqliteRepository),
}

impl Repository {
    /// Open the repository selected by configuration
    pub async fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        match config {
            StorageConfig::Memory => Ok(Repository::Memory(MemoryRepository::new())),
            StorageConfig::Sqlite {
                url,
                max_connections,
            } => Ok(Repository::Sqlite(
                SqliteRepository::connect(url, *max_connections).await?,
            )),
        }
    }

    /// Insert a record and return its ID
    pub async fn insert(&self, record: NewViolationRecord) -> Result<i64, StorageError> {
        match self {
            Repository::Memory(repo) => repo.insert(record),
            Repository::Sqlite(repo) => repo.insert(record).await,
        }
    }

    /// Get a record by ID
    pub async fn get(&self, id: i64) -> Result<ViolationRecord, StorageError> {
        match self {
            Repository::Memory(repo) => repo.get(id),
            Repository::Sqlite(repo) => repo.get(id).await,
        }
    }

    /// List records matching the filter, newest first
    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<ViolationRecord>, StorageError> {
        match self {
            Repository::Memory(repo) => repo.list(filter),
            Repository::Sqlite(repo) => repo.list(filter).await,
        }
    }

    /// Mark a record's fine as paid
    pub async fn mark_paid(&self, id: i64) -> Result<ViolationRecord, StorageError> {
        self.set_payment_status(id, PaymentStatus::Paid).await
    }

    /// Set a record's payment state
    pub async fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<ViolationRecord, StorageError> {
        match self {
            Repository::Memory(repo) => repo.set_payment_status(id, status),
            Repository::Sqlite(repo) => repo.set_payment_status(id, status).await,
        }
    }

    /// Aggregate statistics
    pub async fn stats(&self) -> Result<ViolationStats, StorageError> {
        match self {
            Repository::Memory(repo) => repo.stats(),
            Repository::Sqlite(repo) => repo.stats().await,
        }
    }

    /// Total record count
    pub async fn count(&self) -> Result<u64, StorageError> {
        match self {
            Repository::Memory(repo) => Ok(repo.record_count() as u64),
            Repository::Sqlite(repo) => repo.count().await,
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Repository::Memory(_) => "memory",
            Repository::Sqlite(_) => "sqlite",
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Repository::Memory(MemoryRepository::new())
    }
}

/// In-memory repository
pub struct MemoryRepository {
    /// Records in insertion order
    records: Mutex<Vec<ViolationRecord>>,
    /// Next record ID
    next_id: Mutex<i64>,
}

impl MemoryRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            records: Mutex::new(Vec::with_capacity(1000)),
            next_id: Mutex::new(1),
        }
    }

    /// Insert a record
    pub fn insert(&self, record: NewViolationRecord) -> Result<i64, StorageError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        let mut next_id = self
            .next_id
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        let id = *next_id;
        *next_id += 1;

        records.push(ViolationRecord::from_new(id, record, Utc::now()));
        debug!("Inserted violation record with ID {}", id);

        Ok(id)
    }

    /// Get a record by ID
    pub fn get(&self, id: i64) -> Result<ViolationRecord, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// List records matching the filter, newest first
    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<ViolationRecord>, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        Ok(records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    /// Set a record's payment state; an already paid record keeps its
    /// payment date
    pub fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<ViolationRecord, StorageError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;

        record.set_payment_status(status, Utc::now());
        info!("Violation record {} payment status set to {}", id, status.as_str());

        Ok(record.clone())
    }

    /// Aggregate statistics
    pub fn stats(&self) -> Result<ViolationStats, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        let mut stats = ViolationStats::default();
        let mut by_vehicle: BTreeMap<&str, u64> = BTreeMap::new();

        for record in records.iter() {
            stats.tally(record.payment_status, record.total_fine);
            *by_vehicle.entry(record.vehicle_type.as_str()).or_default() += 1;
        }

        stats.by_vehicle_type = by_vehicle
            .into_iter()
            .map(|(vehicle_type, count)| VehicleCount {
                vehicle_type: vehicle_type.to_string(),
                count,
            })
            .collect();

        Ok(stats)
    }

    /// Get total record count
    pub fn record_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}
