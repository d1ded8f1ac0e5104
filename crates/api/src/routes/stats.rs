//! Statistics Routes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::ApiError, AppState};
use storage::ViolationStats;

/// Aggregate record statistics
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ViolationStats>, ApiError> {
    Ok(Json(state.repository.stats().await?))
}
