//! In-memory `JobBoardBackend` for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    BackendError, CompletenessPayload, JobBoardBackend, RawJobRecord, SearchCriteria,
    SearchResults, SubmitApplication, SubmitOutcome,
};
use crate::ledger::{ApplicationRecord, ApplicationStatus};

#[derive(Debug, Clone)]
pub enum SubmitBehavior {
    Respond(SubmitOutcome),
    Transport,
    Malformed,
    Status(u16, String),
    Hang,
}

pub struct StubBackend {
    listings: Mutex<Vec<RawJobRecord>>,
    completeness: Mutex<Option<CompletenessPayload>>,
    submit: Mutex<SubmitBehavior>,
    hold: Mutex<Option<Arc<Notify>>>,
    history: Mutex<Vec<ApplicationRecord>>,
    history_fails: AtomicBool,
    search: Mutex<SearchResults>,
    pub submitted: Mutex<Vec<SubmitApplication>>,
    pub search_criteria: Mutex<Vec<SearchCriteria>>,
    submit_calls: AtomicUsize,
    history_calls: AtomicUsize,
    completeness_calls: AtomicUsize,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            listings: Mutex::new(Vec::new()),
            completeness: Mutex::new(Some(CompletenessPayload {
                is_complete: true,
                missing_fields: Vec::new(),
                completion_percentage: 100.0,
                message: Some("Profile complete!".to_string()),
            })),
            submit: Mutex::new(SubmitBehavior::Respond(SubmitOutcome {
                success: true,
                ..Default::default()
            })),
            hold: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            history_fails: AtomicBool::new(false),
            search: Mutex::new(SearchResults::default()),
            submitted: Mutex::new(Vec::new()),
            search_criteria: Mutex::new(Vec::new()),
            submit_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            completeness_calls: AtomicUsize::new(0),
        }
    }
}

impl StubBackend {
    pub fn set_listings(&self, jobs: Vec<RawJobRecord>) {
        *self.listings.lock().unwrap() = jobs;
    }

    /// `None` makes the completeness call fail.
    pub fn set_completeness(&self, payload: Option<CompletenessPayload>) {
        *self.completeness.lock().unwrap() = payload;
    }

    pub fn set_submit(&self, behavior: SubmitBehavior) {
        *self.submit.lock().unwrap() = behavior;
    }

    pub fn respond(&self, raw: &str) {
        self.set_submit(SubmitBehavior::Respond(serde_json::from_str(raw).unwrap()));
    }

    /// Submissions park until the returned `Notify` is signalled.
    pub fn hold_submissions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn set_history(&self, records: Vec<ApplicationRecord>) {
        *self.history.lock().unwrap() = records;
    }

    pub fn fail_history(&self, fail: bool) {
        self.history_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_search(&self, results: SearchResults) {
        *self.search.lock().unwrap() = results;
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn completeness_calls(&self) -> usize {
        self.completeness_calls.load(Ordering::SeqCst)
    }
}

pub fn transport_error() -> BackendError {
    // A relative URL fails in the request builder without touching the network.
    match reqwest::Client::new().get("not-a-url").build() {
        Err(e) => BackendError::Http(e),
        Ok(_) => unreachable!("relative URL must not build"),
    }
}

pub fn criteria(title: &str) -> SearchCriteria {
    serde_json::from_value(serde_json::json!({ "job_title": title })).unwrap()
}

pub fn raw_job(id: &str, score: f64) -> RawJobRecord {
    RawJobRecord {
        id: id.to_string(),
        title: format!("Engineer {id}"),
        company: "Acme".to_string(),
        match_score: score,
        can_apply: Some(true),
        job_url: format!("https://jobs.example.com/{id}"),
        ..Default::default()
    }
}

pub fn record(id: &str, job_id: &str, applied_at: &str) -> ApplicationRecord {
    ApplicationRecord {
        id: id.to_string(),
        job_id: Some(job_id.to_string()),
        job_title: "Engineer".to_string(),
        company: "Acme".to_string(),
        status: ApplicationStatus::Submitted,
        applied_at: applied_at.to_string(),
        job_url: String::new(),
    }
}

#[async_trait]
impl JobBoardBackend for StubBackend {
    async fn fetch_job_listings(&self, _user_id: &str) -> Result<Vec<RawJobRecord>, BackendError> {
        Ok(self.listings.lock().unwrap().clone())
    }

    async fn fetch_profile_completeness(
        &self,
        _user_id: &str,
    ) -> Result<CompletenessPayload, BackendError> {
        self.completeness_calls.fetch_add(1, Ordering::SeqCst);
        let payload = self.completeness.lock().unwrap().clone();
        payload.ok_or_else(transport_error)
    }

    async fn submit_application(
        &self,
        request: &SubmitApplication,
    ) -> Result<SubmitOutcome, BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request.clone());

        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        let behavior = self.submit.lock().unwrap().clone();
        match behavior {
            SubmitBehavior::Respond(outcome) => Ok(outcome),
            SubmitBehavior::Transport => Err(transport_error()),
            SubmitBehavior::Malformed => Err(BackendError::Decode(
                serde_json::from_str::<SubmitOutcome>("<html>").unwrap_err(),
            )),
            SubmitBehavior::Status(status, message) => {
                Err(BackendError::Status { status, message })
            }
            SubmitBehavior::Hang => std::future::pending().await,
        }
    }

    async fn fetch_application_history(
        &self,
        _user_id: &str,
    ) -> Result<Vec<ApplicationRecord>, BackendError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.history_fails.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn search_jobs(&self, criteria: &SearchCriteria) -> Result<SearchResults, BackendError> {
        self.search_criteria.lock().unwrap().push(criteria.clone());
        Ok(self.search.lock().unwrap().clone())
    }
}

/// Local HTTP server that reports a complete profile and never answers any
/// other request. Connections stay open until the runtime shuts down.
pub async fn stalling_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if read == buf.len() {
                        return;
                    }
                }

                if buf.starts_with(b"GET /profile-completeness/") {
                    let body = r#"{"is_complete":true,"missing_fields":[],"completion_percentage":100.0}"#;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    return;
                }

                std::future::pending::<()>().await;
                drop(socket);
            });
        }
    });

    format!("http://{addr}")
}
