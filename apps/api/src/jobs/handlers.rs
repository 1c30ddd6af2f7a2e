use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::SearchCriteria;
use crate::errors::{require_user_id, AppError};
use crate::jobs::catalog::{fetch_listings, search_listings};
use crate::jobs::JobView;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobView>,
    pub total: usize,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

/// GET /api/v1/jobs/:user_id
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<JobsResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    let jobs = fetch_listings(state.backend.as_ref(), &state.ledger, user_id).await?;
    let total = jobs.len();
    Ok(Json(JobsResponse {
        jobs: jobs.into_iter().map(JobView::from).collect(),
        total,
    }))
}

/// POST /api/v1/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<JobsResponse>, AppError> {
    if req.criteria.title.trim().is_empty() {
        return Err(AppError::Validation("job_title is required".to_string()));
    }

    let user_id = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let page = search_listings(state.backend.as_ref(), &state.ledger, user_id, &req.criteria).await?;

    Ok(Json(JobsResponse {
        jobs: page.jobs.into_iter().map(JobView::from).collect(),
        total: page.total,
    }))
}
