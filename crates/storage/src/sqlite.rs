//! SQLite repository using sqlx

use crate::record::{
    NewViolationRecord, PaymentStatus, RecordFilter, RecordStatus, VehicleCount, ViolationRecord,
    ViolationStats,
};
use crate::StorageError;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS violation_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER,
    officer_id INTEGER,
    driver_name TEXT,
    license_number TEXT,
    plate_number TEXT,
    vehicle_type TEXT NOT NULL,
    has_helmet TEXT,
    speed INTEGER NOT NULL DEFAULT 0,
    has_license TEXT,
    violations TEXT NOT NULL,
    total_fine INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    payment_status TEXT NOT NULL DEFAULT 'unpaid',
    payment_date TEXT,
    description TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
)
"#;

const SELECT_COLUMNS: &str = "SELECT id, user_id, officer_id, driver_name, license_number, \
     plate_number, vehicle_type, has_helmet, speed, has_license, violations, total_fine, \
     status, payment_status, payment_date, description, location, created_at \
     FROM violation_records";

/// Violation records in an SQLite database
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect, creating the database file and schema if missing.
    ///
    /// An in-memory URL is held on a single never-recycled connection so the
    /// database lives as long as the repository.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections.max(1) });
        if in_memory {
            pool_options = pool_options
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options.connect_with(options).await?;
        let repo = Self { pool };
        repo.migrate().await?;

        info!("Opened SQLite repository at {}", url);
        Ok(repo)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("schema init failed: {e}")))?;
        Ok(())
    }

    /// Insert a record
    pub async fn insert(&self, record: NewViolationRecord) -> Result<i64, StorageError> {
        let violations = serde_json::to_string(&record.violations)?;
        let total_fine = i64::try_from(record.total_fine).map_err(|_| {
            StorageError::SerializationError(format!("fine {} too large", record.total_fine))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO violation_records
                (user_id, officer_id, driver_name, license_number, plate_number, vehicle_type,
                 has_helmet, speed, has_license, violations, total_fine, status, payment_status,
                 description, location, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(record.officer_id)
        .bind(record.driver_name)
        .bind(record.license_number)
        .bind(record.plate_number)
        .bind(record.vehicle_type)
        .bind(record.has_helmet)
        .bind(i64::from(record.speed))
        .bind(record.has_license)
        .bind(violations)
        .bind(total_fine)
        .bind(record.status.as_str())
        .bind(PaymentStatus::Unpaid.as_str())
        .bind(record.description)
        .bind(record.location)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted violation record with ID {}", id);
        Ok(id)
    }

    /// Get a record by ID
    pub async fn get(&self, id: i64) -> Result<ViolationRecord, StorageError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        record_from_row(&row)
    }

    /// List records matching the filter, newest first
    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<ViolationRecord>, StorageError> {
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE (?1 IS NULL OR user_id = ?1) \
             AND (?2 IS NULL OR officer_id = ?2) ORDER BY id DESC LIMIT ?3"
        ))
        .bind(filter.user_id)
        .bind(filter.officer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Set a record's payment state; an already paid record keeps its
    /// payment date and every other state clears it
    pub async fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<ViolationRecord, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE violation_records
               SET payment_date = CASE
                       WHEN ?1 <> 'paid' THEN NULL
                       WHEN payment_status = 'paid' THEN COALESCE(payment_date, ?2)
                       ELSE ?2
                   END,
                   payment_status = ?1
             WHERE id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        info!("Violation record {} payment status set to {}", id, status.as_str());
        self.get(id).await
    }

    /// Aggregate statistics
    pub async fn stats(&self) -> Result<ViolationStats, StorageError> {
        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(total_fine), 0) AS total_fines,
                   COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_fine ELSE 0 END), 0)
                       AS collected,
                   COALESCE(SUM(CASE WHEN COALESCE(NULLIF(payment_status, ''), 'unpaid') = 'unpaid'
                                     THEN total_fine ELSE 0 END), 0) AS unpaid_fines,
                   COUNT(CASE WHEN payment_status = 'paid' THEN 1 END) AS paid_count,
                   COUNT(CASE WHEN COALESCE(NULLIF(payment_status, ''), 'unpaid') = 'unpaid' THEN 1 END)
                       AS unpaid_count,
                   COUNT(CASE WHEN payment_status = 'pending' THEN 1 END) AS pending_count,
                   COUNT(CASE WHEN payment_status = 'overdue' THEN 1 END) AS overdue_count
              FROM violation_records
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let column =
            |name: &str| -> Result<u64, StorageError> { to_u64(totals.try_get::<i64, _>(name)?) };

        let by_vehicle_type = sqlx::query(
            "SELECT COALESCE(vehicle_type, '') AS vehicle_type, COUNT(*) AS count \
             FROM violation_records GROUP BY 1 ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(VehicleCount {
                vehicle_type: text_or_empty(row, "vehicle_type")?,
                count: to_u64(row.try_get::<i64, _>("count")?)?,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(ViolationStats {
            total: column("total")?,
            total_fines: column("total_fines")?,
            collected: column("collected")?,
            unpaid_fines: column("unpaid_fines")?,
            paid_count: column("paid_count")?,
            unpaid_count: column("unpaid_count")?,
            pending_count: column("pending_count")?,
            overdue_count: column("overdue_count")?,
            by_vehicle_type,
        })
    }

    /// Total record count
    pub async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM violation_records")
            .fetch_one(&self.pool)
            .await?;
        to_u64(row.try_get::<i64, _>("total")?)
    }
}

fn to_u64(value: i64) -> Result<u64, StorageError> {
    u64::try_from(value)
        .map_err(|_| StorageError::SerializationError(format!("negative value {value}")))
}

/// Naive layouts SQLite and older tooling write; read as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|ts| ts.and_utc())
        .ok_or_else(|| StorageError::SerializationError(format!("bad timestamp {raw:?}")))
}

/// Decode the stored violation list.
///
/// Rows are written as a JSON array; plain comma-separated text is accepted
/// for rows written by older tooling.
pub(crate) fn decode_violations(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn text_or_empty(row: &SqliteRow, column: &str) -> Result<String, StorageError> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

/// Rows written by older tooling may leave any column NULL; missing text
/// reads as empty, missing numbers as zero and missing states as the
/// insert defaults.
fn record_from_row(row: &SqliteRow) -> Result<ViolationRecord, StorageError> {
    let status = text_or_empty(row, "status")?;
    let payment_status = text_or_empty(row, "payment_status")?;
    let payment_date: Option<String> = row.try_get("payment_date")?;
    let created_at: Option<String> = row.try_get("created_at")?;
    let violations = text_or_empty(row, "violations")?;
    let speed: i64 = row.try_get::<Option<i64>, _>("speed")?.unwrap_or(0);

    Ok(ViolationRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        officer_id: row.try_get("officer_id")?,
        driver_name: row.try_get("driver_name")?,
        license_number: row.try_get("license_number")?,
        plate_number: row.try_get("plate_number")?,
        vehicle_type: text_or_empty(row, "vehicle_type")?,
        has_helmet: row.try_get("has_helmet")?,
        speed: u32::try_from(speed)
            .map_err(|_| StorageError::SerializationError(format!("bad speed {speed}")))?,
        has_license: row.try_get("has_license")?,
        violations: decode_violations(&violations),
        total_fine: to_u64(row.try_get::<Option<i64>, _>("total_fine")?.unwrap_or(0))?,
        status: match status.as_str() {
            "" => RecordStatus::Pending,
            other => RecordStatus::parse(other)
                .ok_or_else(|| StorageError::SerializationError(format!("bad status {other:?}")))?,
        },
        payment_status: match payment_status.as_str() {
            "" => PaymentStatus::Unpaid,
            other => PaymentStatus::parse(other).ok_or_else(|| {
                StorageError::SerializationError(format!("bad payment status {other:?}"))
            })?,
        },
        payment_date: payment_date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_timestamp)
            .transpose()?,
        description: text_or_empty(row, "description")?,
        location: text_or_empty(row, "location")?,
        created_at: match created_at.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => DateTime::<Utc>::default(),
        },
    })
}
