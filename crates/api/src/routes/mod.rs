//! Route handlers

pub mod checks;
pub mod records;
pub mod stats;
pub mod violations;

use rule_engine::{FactSet, ViolationReport};
use storage::{NewViolationRecord, RecordStatus};

/// Base record for an evaluated stop; callers fill in who reported it
pub(crate) fn record_for(
    facts: &FactSet,
    report: &ViolationReport,
    status: RecordStatus,
) -> NewViolationRecord {
    NewViolationRecord {
        user_id: None,
        officer_id: None,
        driver_name: None,
        license_number: None,
        plate_number: None,
        vehicle_type: facts.vehicle.clone(),
        has_helmet: facts.helmet.as_ref().map(|a| a.as_str().to_string()),
        speed: facts.speed,
        has_license: facts.license.as_ref().map(|a| a.as_str().to_string()),
        violations: report.violations.clone(),
        total_fine: report.fine,
        status,
        description: String::new(),
        location: String::new(),
    }
}
