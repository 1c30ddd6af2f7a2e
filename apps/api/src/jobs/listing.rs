use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::backend::RawJobRecord;

/// A job posting as the orchestrator sees it. Immutable for the duration of
/// a search session; a re-search replaces the whole list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub match_score: u8, // 0 – 100
    pub can_apply: bool,
    pub job_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_application_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
}

impl JobListing {
    pub fn match_bucket(&self) -> MatchScoreBucket {
        MatchScoreBucket::from_score(self.match_score)
    }
}

/// Presentation bucket for a match score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchScoreBucket {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl MatchScoreBucket {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => MatchScoreBucket::Excellent,
            80..=89 => MatchScoreBucket::Good,
            70..=79 => MatchScoreBucket::Fair,
            _ => MatchScoreBucket::Weak,
        }
    }
}

/// Listing plus its presentation bucket, as returned to the portal.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub listing: JobListing,
    pub match_bucket: MatchScoreBucket,
}

impl From<JobListing> for JobView {
    fn from(listing: JobListing) -> Self {
        let match_bucket = listing.match_bucket();
        Self {
            listing,
            match_bucket,
        }
    }
}

/// Converts a backend record into a `JobListing`.
///
/// `can_apply` is true only when the backend allows it (absent means yes),
/// the posting is still open (absent means open), and `applied_job_ids`
/// does not already contain a successful application for this job.
pub fn normalize(raw: RawJobRecord, applied_job_ids: &HashSet<String>) -> JobListing {
    let already_applied = applied_job_ids.contains(&raw.id);
    let can_apply = raw.can_apply.unwrap_or(true) && raw.is_open.unwrap_or(true) && !already_applied;

    let match_score = if raw.match_score.is_finite() {
        raw.match_score.round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    JobListing {
        id: raw.id,
        title: raw.title,
        company: raw.company,
        match_score,
        can_apply,
        job_url: raw.job_url,
        manual_application_url: raw.manual_application_url.filter(|u| !u.trim().is_empty()),
        location: raw.location,
        remote: raw.remote,
        source: raw.source,
        posted_date: raw.posted_date,
        salary_range: raw.salary_range,
    }
}
