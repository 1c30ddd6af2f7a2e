//! Application Ledger — read-only projection of past apply attempts.
//!
//! Not a cache: `refresh` always re-fetches and replaces the user's whole
//! sequence. The last fetched sequence is kept only so the listing model can
//! tell which jobs were already applied to.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{BackendError, JobBoardBackend};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Pending,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRecord {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Kept verbatim; the backend emits naive ISO-8601 timestamps.
    #[serde(default)]
    pub applied_at: String,
    #[serde(default)]
    pub job_url: String,
}

impl ApplicationRecord {
    pub fn applied_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.applied_at)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Most recent first. Records whose timestamp cannot be parsed go last,
/// keeping their relative order.
pub fn order_most_recent_first(records: &mut [ApplicationRecord]) {
    records.sort_by_cached_key(|r| std::cmp::Reverse(r.applied_at_utc()));
}

pub struct ApplicationLedger {
    backend: Arc<dyn JobBoardBackend>,
    snapshots: RwLock<HashMap<String, Vec<ApplicationRecord>>>,
}

impl ApplicationLedger {
    pub fn new(backend: Arc<dyn JobBoardBackend>) -> Self {
        Self {
            backend,
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Re-fetches the user's history and replaces the previous sequence.
    /// On failure the previous sequence is left as it was.
    pub async fn refresh(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, BackendError> {
        let mut records = self.backend.fetch_application_history(user_id).await?;
        order_most_recent_first(&mut records);
        debug!(user_id, count = records.len(), "Application ledger refreshed");

        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), records.clone());
        Ok(records)
    }

    /// The sequence from the last successful refresh, empty if none.
    pub fn snapshot(&self, user_id: &str) -> Vec<ApplicationRecord> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Job ids with a submitted application in the last snapshot.
    pub fn applied_job_ids(&self, user_id: &str) -> HashSet<String> {
        self.snapshot(user_id)
            .into_iter()
            .filter(|r| r.status == ApplicationStatus::Submitted)
            .filter_map(|r| r.job_id)
            .collect()
    }
}
