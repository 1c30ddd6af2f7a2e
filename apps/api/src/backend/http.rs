use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    BackendError, CompletenessPayload, JobBoardBackend, JobListingsPayload, RawJobRecord,
    SearchCriteria, SearchResults, SubmitApplication, SubmitOutcome,
};
use crate::ledger::ApplicationRecord;

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// History comes back either as a bare array or wrapped in `applications`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    List(Vec<ApplicationRecord>),
    Wrapped {
        #[serde(default)]
        applications: Vec<ApplicationRecord>,
    },
}

/// `JobBoardBackend` over the backend's REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    read_timeout: Duration,
}

impl HttpBackend {
    /// `read_timeout` bounds listing, completeness, history and search calls.
    /// Submissions carry no client-side limit; the orchestrator owns that one.
    pub fn new(base_url: impl Into<String>, read_timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            read_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.read_timeout)
            .send()
            .await?;
        decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, BackendError> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(limit) = timeout {
            request = request.timeout(limit);
        }
        decode(path, request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorDetail>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        warn!("Backend {path} returned {status}: {message}");
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    debug!("Backend {path} returned {status} ({} bytes)", body.len());
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl JobBoardBackend for HttpBackend {
    async fn fetch_job_listings(&self, user_id: &str) -> Result<Vec<RawJobRecord>, BackendError> {
        let payload: JobListingsPayload = self.get_json(&format!("/job-listings/{user_id}")).await?;
        Ok(payload.jobs)
    }

    async fn fetch_profile_completeness(
        &self,
        user_id: &str,
    ) -> Result<CompletenessPayload, BackendError> {
        self.get_json(&format!("/profile-completeness/{user_id}"))
            .await
    }

    async fn submit_application(
        &self,
        request: &SubmitApplication,
    ) -> Result<SubmitOutcome, BackendError> {
        self.post_json("/apply-to-job", request, None).await
    }

    async fn fetch_application_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationRecord>, BackendError> {
        let payload: HistoryPayload = self.get_json(&format!("/applications/{user_id}")).await?;
        Ok(match payload {
            HistoryPayload::List(records) => records,
            HistoryPayload::Wrapped { applications } => applications,
        })
    }

    async fn search_jobs(&self, criteria: &SearchCriteria) -> Result<SearchResults, BackendError> {
        self.post_json("/search-jobs", criteria, Some(self.read_timeout))
            .await
    }
}
