use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::{require_user_id, AppError};
use crate::profile::CompletenessVerdict;
use crate::state::AppState;

/// GET /api/v1/profile/:user_id/completeness
///
/// Always 200: an unreachable backend is reported as `{"status":"unknown"}`.
pub async fn handle_completeness(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CompletenessVerdict>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.gate.check_completeness(user_id).await))
}

/// Last recorded gate state, without contacting the backend.
#[derive(Debug, Serialize)]
pub struct GateStatus {
    pub checked: bool,
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
}

/// GET /api/v1/profile/:user_id/gate
pub async fn handle_gate_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<GateStatus>, AppError> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(GateStatus {
        checked: state.gate.verdict(user_id).is_some(),
        is_complete: state.gate.is_complete(user_id),
        missing_fields: state.gate.missing_fields(user_id),
    }))
}
