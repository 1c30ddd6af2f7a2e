use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::apply::registry::AttemptStatus;

pub const UNVERIFIED_MESSAGE: &str = "Profile completeness could not be verified";

pub const TRANSPORT_MESSAGE: &str =
    "Could not reach the job board. Check your connection and try again.";

/// Why an attempt ended in `FailedTerminal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalCause {
    /// The backend answered and refused; `error` is its message, verbatim.
    Rejected { error: String },
    /// No usable response (connection failure or undecodable body).
    Transport { detail: String },
    TimedOut { after_secs: u64 },
}

impl TerminalCause {
    /// Text to show the user.
    pub fn user_message(&self) -> String {
        match self {
            TerminalCause::Rejected { error } => error.clone(),
            TerminalCause::Transport { .. } => TRANSPORT_MESSAGE.to_string(),
            TerminalCause::TimedOut { after_secs } => format!(
                "The job board did not answer within {after_secs}s. Check your applications before trying again."
            ),
        }
    }
}

/// Result of a single `apply` call. Every variant is terminal: the job is
/// back to idle once this value is returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyResolution {
    Succeeded {
        job_title: String,
        company: String,
        application_id: Option<String>,
        message: Option<String>,
    },
    /// The listing does not allow applying. No request was made.
    NotEligible { job_id: String },
    /// Another attempt for the same job is still running. No request was made.
    AlreadyInFlight { job_id: String },
    /// `unverified` is set when completeness could not be determined at all.
    BlockedIncompleteProfile {
        missing_fields: Vec<String>,
        message: Option<String>,
        #[serde(default)]
        unverified: bool,
    },
    /// Automated submission failed but a person could still apply.
    /// Never retried automatically.
    FailedRetryable {
        error: String,
        manual_application_url: Option<String>,
    },
    FailedTerminal { cause: TerminalCause },
}

impl ApplyResolution {
    /// Classified state this resolution passed through. Guard rejections
    /// never leave `Idle`.
    pub fn status(&self) -> AttemptStatus {
        match self {
            ApplyResolution::Succeeded { .. } => AttemptStatus::Succeeded,
            ApplyResolution::NotEligible { .. } | ApplyResolution::AlreadyInFlight { .. } => {
                AttemptStatus::Idle
            }
            ApplyResolution::BlockedIncompleteProfile { .. } => {
                AttemptStatus::BlockedIncompleteProfile
            }
            ApplyResolution::FailedRetryable { .. } => AttemptStatus::FailedRetryable,
            ApplyResolution::FailedTerminal { .. } => AttemptStatus::FailedTerminal,
        }
    }

    pub fn is_guard_rejection(&self) -> bool {
        self.status() == AttemptStatus::Idle
    }

    /// One-line notification text.
    pub fn summary(&self) -> String {
        match self {
            ApplyResolution::Succeeded {
                job_title, company, ..
            } => format!("Successfully applied to {job_title} at {company}"),
            ApplyResolution::NotEligible { .. } => {
                "This job is not open for applications".to_string()
            }
            ApplyResolution::AlreadyInFlight { .. } => {
                "An application for this job is already in progress".to_string()
            }
            ApplyResolution::BlockedIncompleteProfile {
                unverified: true, ..
            } => UNVERIFIED_MESSAGE.to_string(),
            ApplyResolution::BlockedIncompleteProfile { missing_fields, .. }
                if missing_fields.is_empty() =>
            {
                "Cannot apply. Your profile is incomplete".to_string()
            }
            ApplyResolution::BlockedIncompleteProfile { missing_fields, .. } => {
                format!("Cannot apply. Missing: {}", missing_fields.join(", "))
            }
            ApplyResolution::FailedRetryable { error, .. } => {
                format!("Application failed: {error}. You can still apply manually.")
            }
            ApplyResolution::FailedTerminal { cause } => {
                format!("Application failed: {}", cause.user_message())
            }
        }
    }
}

/// Published for every `apply` call, including guard rejections.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyEvent {
    pub attempt_id: Uuid,
    pub user_id: String,
    pub job_id: String,
    pub resolution: ApplyResolution,
    pub resolved_at: DateTime<Utc>,
}
