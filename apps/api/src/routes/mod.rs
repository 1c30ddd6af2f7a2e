pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::apply::handlers as apply;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Listings & search
        .route("/api/v1/jobs/search", post(jobs::handle_search_jobs))
        .route("/api/v1/jobs/:user_id", get(jobs::handle_list_jobs))
        // Profile gate
        .route(
            "/api/v1/profile/:user_id/completeness",
            get(profile::handle_completeness),
        )
        .route("/api/v1/profile/:user_id/gate", get(profile::handle_gate_status))
        // Apply orchestration
        .route("/api/v1/apply", post(apply::handle_apply))
        .route("/api/v1/apply/:user_id/in-flight", get(apply::handle_in_flight))
        // Ledger
        .route("/api/v1/applications/:user_id", get(apply::handle_applications))
        .with_state(state)
}
