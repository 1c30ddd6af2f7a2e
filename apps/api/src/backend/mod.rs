//! Job-board backend boundary.
//!
//! Every remote operation the gateway needs is expressed on `JobBoardBackend`.
//! Production uses `HttpBackend`; tests substitute in-memory stubs. Nothing
//! outside this module talks to the backend's HTTP API directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::ApplicationRecord;

pub mod http;
#[cfg(test)]
pub mod testing;

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// True when no usable response came back (connection failure or a
    /// body that could not be decoded).
    pub fn is_transport(&self) -> bool {
        !matches!(self, BackendError::Status { .. })
    }
}

/// A job posting as the backend sends it, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJobRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub can_apply: Option<bool>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub job_url: String,
    #[serde(default)]
    pub manual_application_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListingsPayload {
    #[serde(default)]
    pub jobs: Vec<RawJobRecord>,
}

/// Completeness verdict exactly as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletenessPayload {
    pub is_complete: bool,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /apply-to-job`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitApplication {
    pub job_id: String,
    pub user_id: String,
    pub job_title: String,
    pub company: String,
    pub job_url: String,
}

/// Raw apply result. Classification happens in `apply::classify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub missing_fields: Option<Vec<String>>,
    #[serde(default)]
    pub retry_possible: Option<bool>,
    #[serde(default)]
    pub manual_application_url: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(rename = "job_title")]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub salary_min: u32,
    #[serde(default = "default_salary_max")]
    pub salary_max: u32,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_salary_max() -> u32 {
    500_000
}

fn default_search_limit() -> u32 {
    1000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub jobs: Vec<RawJobRecord>,
    #[serde(default)]
    pub total: usize,
}

/// The collaborator contract. All calls are fallible and may take arbitrarily
/// long; callers decide on timeouts.
#[async_trait]
pub trait JobBoardBackend: Send + Sync {
    async fn fetch_job_listings(&self, user_id: &str) -> Result<Vec<RawJobRecord>, BackendError>;

    async fn fetch_profile_completeness(
        &self,
        user_id: &str,
    ) -> Result<CompletenessPayload, BackendError>;

    async fn submit_application(
        &self,
        request: &SubmitApplication,
    ) -> Result<SubmitOutcome, BackendError>;

    async fn fetch_application_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationRecord>, BackendError>;

    async fn search_jobs(&self, criteria: &SearchCriteria) -> Result<SearchResults, BackendError>;
}
