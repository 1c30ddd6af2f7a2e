use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::apply::{ApplyAttempt, ApplyResolution};
use crate::errors::{require_user_id, AppError};
use crate::jobs::JobListing;
use crate::ledger::ApplicationRecord;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub user_id: String,
    pub job: JobListing,
}

/// POST /api/v1/apply
///
/// Every resolution, including guard rejections, is a 200 with an
/// `outcome`-tagged body.
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<ApplyResolution>, AppError> {
    let user_id = require_user_id(&req.user_id)?;
    if req.job.id.trim().is_empty() {
        return Err(AppError::Validation("job.id is required".to_string()));
    }
    Ok(Json(state.orchestrator.apply(&req.job, user_id).await))
}

/// GET /api/v1/apply/:user_id/in-flight
pub async fn handle_in_flight(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ApplyAttempt>>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.orchestrator.in_flight(user_id)))
}

/// GET /api/v1/applications/:user_id
pub async fn handle_applications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.ledger.refresh(user_id).await?))
}
