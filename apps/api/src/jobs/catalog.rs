//! Listing and search passthrough. The backend owns matching and filtering;
//! this layer only normalizes what comes back.

use tracing::{info, warn};

use crate::backend::{BackendError, JobBoardBackend, SearchCriteria};
use crate::jobs::listing::{normalize, JobListing};
use crate::ledger::ApplicationLedger;

/// Fetches the user's recommended listings. The ledger is refreshed first so
/// that jobs with a submitted application come back with `can_apply = false`;
/// if that refresh fails the last known snapshot is used.
pub async fn fetch_listings(
    backend: &dyn JobBoardBackend,
    ledger: &ApplicationLedger,
    user_id: &str,
) -> Result<Vec<JobListing>, BackendError> {
    if let Err(e) = ledger.refresh(user_id).await {
        warn!(user_id, "Ledger refresh before listing failed: {e}");
    }
    let applied = ledger.applied_job_ids(user_id);

    let jobs: Vec<JobListing> = backend
        .fetch_job_listings(user_id)
        .await?
        .into_iter()
        .map(|raw| normalize(raw, &applied))
        .collect();

    info!(user_id, count = jobs.len(), "Job listings loaded");
    Ok(jobs)
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub jobs: Vec<JobListing>,
    pub total: usize,
}

/// Runs a backend search. When `user_id` is given, the user's last ledger
/// snapshot marks already-applied jobs.
pub async fn search_listings(
    backend: &dyn JobBoardBackend,
    ledger: &ApplicationLedger,
    user_id: Option<&str>,
    criteria: &SearchCriteria,
) -> Result<SearchPage, BackendError> {
    let applied = user_id
        .map(|id| ledger.applied_job_ids(id))
        .unwrap_or_default();

    let results = backend.search_jobs(criteria).await?;
    let jobs: Vec<JobListing> = results
        .jobs
        .into_iter()
        .map(|raw| normalize(raw, &applied))
        .collect();
    let total = results.total.max(jobs.len());

    info!(
        title = %criteria.title,
        location = %criteria.location,
        count = jobs.len(),
        total,
        "Job search completed"
    );
    Ok(SearchPage { jobs, total })
}
