//! Field Recording Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use data_validator::RawStop;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use rule_engine::{format_fine, ViolationReport};
use storage::{NewViolationRecord, RecordStatus};

use super::record_for;
use crate::{error::ApiError, AppState};

/// Response for a recorded stop
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub message: String,
    pub report: ViolationReport,
}

/// Record an officer's field stop; the stop is stored even when legal
pub async fn record_stop(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawStop>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let Json(raw) = payload?;
    let stop = state.validator.stop(&raw)?;
    let report = state.rules.evaluate(&stop.facts);
    metrics::counter!("violation_evaluations_total", "status" => report.status.as_str())
        .increment(1);

    let message = if report.is_violation() {
        format!(
            "Recorded {} violation(s) for {} with total fine: {} KHR",
            report.violation_count(),
            stop.driver.driver_name,
            format_fine(report.fine)
        )
    } else {
        format!("No violations detected for {}", stop.driver.driver_name)
    };

    let record = NewViolationRecord {
        officer_id: Some(stop.officer_id),
        driver_name: Some(stop.driver.driver_name),
        license_number: stop.driver.license_number,
        plate_number: Some(stop.driver.plate_number),
        description: stop.description,
        location: stop.location,
        ..record_for(&stop.facts, &report, RecordStatus::Confirmed)
    };
    let id = state.repository.insert(record).await?;
    metrics::counter!("violation_records_total", "source" => "officer").increment(1);
    info!("Officer {} stop record {}: {}", stop.officer_id, id, message);

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            id,
            message,
            report,
        }),
    ))
}
