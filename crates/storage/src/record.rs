//! Violation record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Self-reported, awaiting review
    Pending,
    /// Recorded by an officer in the field
    Confirmed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(RecordStatus::Pending),
            "confirmed" => Some(RecordStatus::Confirmed),
            _ => None,
        }
    }
}

/// Payment state of a record's fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    /// Payment submitted but not yet settled
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            "pending" => Some(PaymentStatus::Pending),
            "overdue" => Some(PaymentStatus::Overdue),
            _ => None,
        }
    }
}

/// A record to be inserted; id and timestamps are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewViolationRecord {
    /// Citizen who self-reported
    pub user_id: Option<i64>,
    /// Officer who recorded the stop
    pub officer_id: Option<i64>,
    pub driver_name: Option<String>,
    pub license_number: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: String,
    pub has_helmet: Option<String>,
    pub speed: u32,
    pub has_license: Option<String>,
    /// Violation descriptions in rule order
    pub violations: Vec<String>,
    /// Total fine (KHR)
    pub total_fine: u64,
    pub status: RecordStatus,
    pub description: String,
    pub location: String,
}

/// A stored violation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub officer_id: Option<i64>,
    pub driver_name: Option<String>,
    pub license_number: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: String,
    pub has_helmet: Option<String>,
    pub speed: u32,
    pub has_license: Option<String>,
    pub violations: Vec<String>,
    pub total_fine: u64,
    pub status: RecordStatus,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub description: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl ViolationRecord {
    /// Materialize a new record as unpaid
    pub fn from_new(id: i64, record: NewViolationRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: record.user_id,
            officer_id: record.officer_id,
            driver_name: record.driver_name,
            license_number: record.license_number,
            plate_number: record.plate_number,
            vehicle_type: record.vehicle_type,
            has_helmet: record.has_helmet,
            speed: record.speed,
            has_license: record.has_license,
            violations: record.violations,
            total_fine: record.total_fine,
            status: record.status,
            payment_status: PaymentStatus::Unpaid,
            payment_date: None,
            description: record.description,
            location: record.location,
            created_at,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Move to a payment state. Becoming paid stamps the payment date unless
    /// the record was already paid; any other state clears it.
    pub fn set_payment_status(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.payment_date = match status {
            PaymentStatus::Paid if self.is_paid() => self.payment_date.or(Some(now)),
            PaymentStatus::Paid => Some(now),
            _ => None,
        };
        self.payment_status = status;
    }
}

/// Listing filter; newest records first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub user_id: Option<i64>,
    pub officer_id: Option<i64>,
    pub limit: usize,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            officer_id: None,
            limit: 50,
        }
    }
}

impl RecordFilter {
    pub fn matches(&self, record: &ViolationRecord) -> bool {
        self.user_id.map_or(true, |id| record.user_id == Some(id))
            && self.officer_id.map_or(true, |id| record.officer_id == Some(id))
    }
}

/// Record count for one vehicle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCount {
    pub vehicle_type: String,
    pub count: u64,
}

/// Aggregate statistics over all records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationStats {
    /// Number of records
    pub total: u64,
    /// Sum of all fines
    pub total_fines: u64,
    /// Sum of paid fines
    pub collected: u64,
    /// Sum of fines still marked unpaid
    pub unpaid_fines: u64,
    /// Records per payment state
    pub paid_count: u64,
    pub unpaid_count: u64,
    pub pending_count: u64,
    pub overdue_count: u64,
    /// Records per vehicle type, sorted by type
    pub by_vehicle_type: Vec<VehicleCount>,
}

impl ViolationStats {
    /// Add one record's fine to the payment totals
    pub(crate) fn tally(&mut self, status: PaymentStatus, fine: u64) {
        self.total += 1;
        self.total_fines += fine;
        match status {
            PaymentStatus::Paid => {
                self.collected += fine;
                self.paid_count += 1;
            }
            PaymentStatus::Unpaid => {
                self.unpaid_fines += fine;
                self.unpaid_count += 1;
            }
            PaymentStatus::Pending => self.pending_count += 1,
            PaymentStatus::Overdue => self.overdue_count += 1,
        }
    }
}
