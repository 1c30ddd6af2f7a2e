//! Backend apply result → `ApplyResolution`.
//!
//! Decision order:
//! 1. `success = true`                          → Succeeded
//! 2. `error == "Profile incomplete"`           → BlockedIncompleteProfile
//! 3. `retry_possible = true`                   → FailedRetryable
//! 4. any other refusal                         → FailedTerminal (rejected)
//! 5. no usable response                        → FailedTerminal (transport)

use crate::apply::resolution::{ApplyResolution, TerminalCause};
use crate::backend::{BackendError, SubmitOutcome};
use crate::jobs::JobListing;

pub const PROFILE_INCOMPLETE_ERROR: &str = "Profile incomplete";

const UNKNOWN_ERROR: &str = "Unknown error";

pub fn classify(job: &JobListing, result: Result<SubmitOutcome, BackendError>) -> ApplyResolution {
    let outcome = match result {
        Ok(outcome) => outcome,
        // The backend answered, just not with 2xx: surface what it said.
        Err(BackendError::Status { message, .. }) => {
            return ApplyResolution::FailedTerminal {
                cause: TerminalCause::Rejected { error: message },
            }
        }
        Err(e) => {
            return ApplyResolution::FailedTerminal {
                cause: TerminalCause::Transport {
                    detail: e.to_string(),
                },
            }
        }
    };

    if outcome.success {
        return ApplyResolution::Succeeded {
            job_title: job.title.clone(),
            company: job.company.clone(),
            application_id: outcome.application_id,
            message: outcome.message,
        };
    }

    if outcome.error.as_deref() == Some(PROFILE_INCOMPLETE_ERROR) {
        return ApplyResolution::BlockedIncompleteProfile {
            missing_fields: outcome.missing_fields.unwrap_or_default(),
            message: outcome.message,
            unverified: false,
        };
    }

    let error = outcome
        .error
        .or(outcome.message)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    if outcome.retry_possible == Some(true) {
        let manual_application_url = outcome
            .manual_application_url
            .filter(|u| !u.is_empty())
            .or_else(|| job.manual_application_url.clone());
        return ApplyResolution::FailedRetryable {
            error,
            manual_application_url,
        };
    }

    ApplyResolution::FailedTerminal {
        cause: TerminalCause::Rejected { error },
    }
}
