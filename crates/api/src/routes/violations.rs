//! Violation Record Routes

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, AppState};
use storage::{PaymentStatus, RecordFilter, ViolationRecord};

/// Query parameters for the violations endpoint
#[derive(Debug, Deserialize)]
pub struct ViolationQuery {
    /// Records self-reported by this user
    pub user_id: Option<i64>,
    /// Records taken by this officer
    pub officer_id: Option<i64>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for the violations endpoint
#[derive(Debug, Serialize)]
pub struct ViolationListResponse {
    pub data: Vec<ViolationRecord>,
    pub count: usize,
}

/// List records, newest first
pub async fn get_violations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViolationQuery>,
) -> Result<Json<ViolationListResponse>, ApiError> {
    let filter = RecordFilter {
        user_id: params.user_id,
        officer_id: params.officer_id,
        limit: params.limit.min(500),
    };

    let data = state.repository.list(&filter).await?;

    Ok(Json(ViolationListResponse {
        count: data.len(),
        data,
    }))
}

/// Get a single record
pub async fn get_violation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ViolationRecord>, ApiError> {
    Ok(Json(state.repository.get(id).await?))
}

/// Mark a record's fine as paid
pub async fn pay_violation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ViolationRecord>, ApiError> {
    Ok(Json(state.repository.mark_paid(id).await?))
}

/// Payment state update request
#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    /// One of `paid`, `unpaid`, `pending`, `overdue`
    pub payment_status: String,
}

/// Set a record's payment state; `paid` stamps the payment date, every other
/// state clears it
pub async fn set_payment_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<PaymentStatusRequest>, JsonRejection>,
) -> Result<Json<ViolationRecord>, ApiError> {
    let Json(request) = payload?;
    let status = PaymentStatus::parse(&request.payment_status).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid payment status: {}", request.payment_status))
    })?;

    Ok(Json(state.repository.set_payment_status(id, status).await?))
}
