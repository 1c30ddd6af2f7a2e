//! Apply Orchestrator — per-job state machine for automated applications.
//!
//! ```text
//! Idle ─apply(), guards pass─▶ InFlight ─classified─▶ {Succeeded | BlockedIncompleteProfile
//!                                                      | FailedRetryable | FailedTerminal} ─▶ Idle
//! ```
//!
//! Guards, in order:
//! 1. `job.can_apply == false`          → NotEligible, no request
//! 2. slot for (user, job) already held → AlreadyInFlight, no request
//! 3. profile gate not complete         → BlockedIncompleteProfile, no submission
//!
//! The slot is claimed before the first `.await` and released by
//! `InFlightGuard` whichever way the call ends.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::apply::classify::classify;
use crate::apply::registry::{ApplyAttempt, InFlightRegistry};
use crate::apply::resolution::{ApplyEvent, ApplyResolution, TerminalCause, UNVERIFIED_MESSAGE};
use crate::backend::{JobBoardBackend, SubmitApplication};
use crate::jobs::JobListing;
use crate::ledger::ApplicationLedger;
use crate::profile::{CompletenessGate, CompletenessVerdict};

const EVENT_CAPACITY: usize = 64;

pub struct ApplyOrchestrator {
    backend: Arc<dyn JobBoardBackend>,
    gate: Arc<CompletenessGate>,
    ledger: Arc<ApplicationLedger>,
    registry: InFlightRegistry,
    events: broadcast::Sender<ApplyEvent>,
    apply_timeout: Option<Duration>,
}

impl ApplyOrchestrator {
    pub fn new(
        backend: Arc<dyn JobBoardBackend>,
        gate: Arc<CompletenessGate>,
        ledger: Arc<ApplicationLedger>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            gate,
            ledger,
            registry: InFlightRegistry::new(),
            events,
            apply_timeout: None,
        }
    }

    /// Bounds the submission call. `None` waits indefinitely.
    pub fn with_timeout(mut self, apply_timeout: Option<Duration>) -> Self {
        self.apply_timeout = apply_timeout;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ApplyEvent> {
        self.events.subscribe()
    }

    pub fn in_flight(&self, user_id: &str) -> Vec<ApplyAttempt> {
        self.registry.attempts_for(user_id)
    }

    pub fn is_in_flight(&self, user_id: &str, job_id: &str) -> bool {
        self.registry.is_in_flight(user_id, job_id)
    }

    /// Runs one apply attempt for `job` on behalf of `user_id`.
    ///
    /// On `Succeeded` the application ledger is refreshed once before
    /// returning; a failed refresh is logged and does not change the outcome.
    pub async fn apply(&self, job: &JobListing, user_id: &str) -> ApplyResolution {
        let attempt_id = Uuid::new_v4();

        let resolution = if !job.can_apply {
            debug!(user_id, job_id = %job.id, "Apply rejected: job not eligible");
            ApplyResolution::NotEligible {
                job_id: job.id.clone(),
            }
        } else {
            match self.registry.try_acquire(attempt_id, user_id, &job.id) {
                None => {
                    debug!(user_id, job_id = %job.id, "Apply rejected: already in flight");
                    ApplyResolution::AlreadyInFlight {
                        job_id: job.id.clone(),
                    }
                }
                Some(slot) => {
                    info!(
                        attempt_id = %slot.attempt_id(),
                        user_id,
                        job_id = %job.id,
                        "Apply attempt started"
                    );
                    let resolution = self.run_attempt(job, user_id).await;
                    drop(slot);
                    resolution
                }
            }
        };

        if matches!(resolution, ApplyResolution::Succeeded { .. }) {
            if let Err(e) = self.ledger.refresh(user_id).await {
                warn!(user_id, "Ledger refresh after successful apply failed: {e}");
            }
        }

        if !resolution.is_guard_rejection() {
            info!(
                %attempt_id,
                user_id,
                job_id = %job.id,
                status = ?resolution.status(),
                "Apply attempt resolved"
            );
        }

        // No subscribers is fine.
        let _ = self.events.send(ApplyEvent {
            attempt_id,
            user_id: user_id.to_string(),
            job_id: job.id.clone(),
            resolution: resolution.clone(),
            resolved_at: Utc::now(),
        });

        resolution
    }

    async fn run_attempt(&self, job: &JobListing, user_id: &str) -> ApplyResolution {
        let verdict = self.gate.check_completeness(user_id).await;
        if !verdict.is_complete() {
            return match verdict {
                CompletenessVerdict::Known(profile) => ApplyResolution::BlockedIncompleteProfile {
                    missing_fields: profile.missing_fields,
                    message: profile.message,
                    unverified: false,
                },
                CompletenessVerdict::Unknown { reason } => {
                    warn!(user_id, job_id = %job.id, "Blocking apply, completeness unknown: {reason}");
                    ApplyResolution::BlockedIncompleteProfile {
                        missing_fields: Vec::new(),
                        message: Some(UNVERIFIED_MESSAGE.to_string()),
                        unverified: true,
                    }
                }
            };
        }

        let request = SubmitApplication {
            job_id: job.id.clone(),
            user_id: user_id.to_string(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            job_url: job.job_url.clone(),
        };

        let submission = self.backend.submit_application(&request);
        let result = match self.apply_timeout {
            Some(limit) => match tokio::time::timeout(limit, submission).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(user_id, job_id = %job.id, "Apply timed out after {}s", limit.as_secs());
                    return ApplyResolution::FailedTerminal {
                        cause: TerminalCause::TimedOut {
                            after_secs: limit.as_secs(),
                        },
                    };
                }
            },
            None => submission.await,
        };

        if let Err(e) = &result {
            warn!(user_id, job_id = %job.id, transport = e.is_transport(), "Apply request failed: {e}");
        }

        classify(job, result)
    }
}
