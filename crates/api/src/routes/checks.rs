//! Self-check Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use data_validator::RawFacts;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use rule_engine::{format_fine, ViolationReport};
use storage::{NewViolationRecord, RecordStatus};

use super::record_for;
use crate::{error::ApiError, AppState};

/// Description stored with self-reported records
pub const SELF_REPORT_DESCRIPTION: &str = "Self-reported violation";

/// Self-check request: the stop facts plus the reporting citizen
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub facts: RawFacts,
}

/// Evaluate a citizen's own stop; the report is returned verbatim and kept
/// only when it contains violations
pub async fn check_violation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<ViolationReport>, ApiError> {
    let Json(request) = payload?;
    let facts = state.validator.facts(&request.facts)?;
    let report = state.rules.evaluate(&facts);
    metrics::counter!("violation_evaluations_total", "status" => report.status.as_str())
        .increment(1);

    if report.is_violation() {
        let record = NewViolationRecord {
            user_id: request.user_id,
            description: SELF_REPORT_DESCRIPTION.to_string(),
            ..record_for(&facts, &report, RecordStatus::Pending)
        };
        let id = state.repository.insert(record).await?;
        metrics::counter!("violation_records_total", "source" => "self_check").increment(1);
        info!(
            "Self-check record {} saved: {} violation(s), fine {} KHR",
            id,
            report.violation_count(),
            format_fine(report.fine)
        );
    }

    Ok(Json(report))
}
