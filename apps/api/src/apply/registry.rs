//! In-flight attempt registry.
//!
//! Check-and-set happens under one mutex acquisition, so at most one attempt
//! per (user, job) can hold a slot even on the multi-threaded runtime. Slots
//! are released by `InFlightGuard::drop` on every exit path.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Idle,
    InFlight,
    Succeeded,
    BlockedIncompleteProfile,
    FailedRetryable,
    FailedTerminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    pub user_id: String,
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplyAttempt {
    pub attempt_id: Uuid,
    pub job_id: String,
    pub user_id: String,
    pub status: AttemptStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InFlightRegistry {
    attempts: Mutex<HashMap<AttemptKey, ApplyAttempt>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AttemptKey, ApplyAttempt>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the slot for `(user_id, job_id)`. Returns `None` if another
    /// attempt already holds it.
    pub fn try_acquire(
        &self,
        attempt_id: Uuid,
        user_id: &str,
        job_id: &str,
    ) -> Option<InFlightGuard<'_>> {
        let key = AttemptKey {
            user_id: user_id.to_string(),
            job_id: job_id.to_string(),
        };

        let mut attempts = self.lock();
        if attempts.contains_key(&key) {
            return None;
        }
        attempts.insert(
            key.clone(),
            ApplyAttempt {
                attempt_id,
                job_id: job_id.to_string(),
                user_id: user_id.to_string(),
                status: AttemptStatus::InFlight,
                created_at: Utc::now(),
            },
        );

        Some(InFlightGuard {
            registry: self,
            key,
            attempt_id,
        })
    }

    pub fn is_in_flight(&self, user_id: &str, job_id: &str) -> bool {
        self.lock().contains_key(&AttemptKey {
            user_id: user_id.to_string(),
            job_id: job_id.to_string(),
        })
    }

    /// Current attempts for a user, oldest first.
    pub fn attempts_for(&self, user_id: &str) -> Vec<ApplyAttempt> {
        let mut attempts: Vec<ApplyAttempt> = self
            .lock()
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.created_at);
        attempts
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, key: &AttemptKey, attempt_id: Uuid) {
        let mut attempts = self.lock();
        if attempts.get(key).map(|a| a.attempt_id) == Some(attempt_id) {
            attempts.remove(key);
        }
    }
}

/// Holds an in-flight slot; dropping it frees the slot.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    key: AttemptKey,
    attempt_id: Uuid,
}

impl InFlightGuard<'_> {
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.attempt_id);
    }
}
