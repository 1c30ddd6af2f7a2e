use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{CompletenessPayload, JobBoardBackend};

/// Stand-in when the backend reports "incomplete" without naming a field.
pub const UNSPECIFIED_FIELD: &str = "Profile details";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileCompleteness {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
    pub completion_percentage: u8,
    pub message: Option<String>,
}

impl ProfileCompleteness {
    /// Normalizes a backend verdict so that `is_complete` holds exactly when
    /// `missing_fields` is empty. Disagreement always resolves to incomplete.
    pub fn from_payload(payload: CompletenessPayload) -> Self {
        let mut missing_fields: Vec<String> = Vec::with_capacity(payload.missing_fields.len());
        for field in payload.missing_fields {
            let field = field.trim();
            if !field.is_empty() && !missing_fields.iter().any(|f| f == field) {
                missing_fields.push(field.to_string());
            }
        }

        if !payload.is_complete && missing_fields.is_empty() {
            missing_fields.push(UNSPECIFIED_FIELD.to_string());
        }

        let completion_percentage = if payload.completion_percentage.is_finite() {
            payload.completion_percentage.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        Self {
            is_complete: missing_fields.is_empty(),
            missing_fields,
            completion_percentage,
            message: payload.message,
        }
    }
}

/// Outcome of a completeness check. `Unknown` is never treated as complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletenessVerdict {
    Known(ProfileCompleteness),
    Unknown { reason: String },
}

impl CompletenessVerdict {
    pub fn is_complete(&self) -> bool {
        matches!(self, CompletenessVerdict::Known(p) if p.is_complete)
    }

    pub fn missing_fields(&self) -> &[String] {
        match self {
            CompletenessVerdict::Known(p) => &p.missing_fields,
            CompletenessVerdict::Unknown { .. } => &[],
        }
    }
}

/// Holds the latest completeness verdict per user for the current session.
pub struct CompletenessGate {
    backend: Arc<dyn JobBoardBackend>,
    verdicts: RwLock<HashMap<String, CompletenessVerdict>>,
}

impl CompletenessGate {
    pub fn new(backend: Arc<dyn JobBoardBackend>) -> Self {
        Self {
            backend,
            verdicts: RwLock::new(HashMap::new()),
        }
    }

    /// Pulls a fresh verdict from the backend. A failed fetch yields
    /// `Unknown` rather than an error.
    pub async fn check_completeness(&self, user_id: &str) -> CompletenessVerdict {
        let verdict = match self.backend.fetch_profile_completeness(user_id).await {
            Ok(payload) => {
                let completeness = ProfileCompleteness::from_payload(payload);
                debug!(
                    user_id,
                    complete = completeness.is_complete,
                    percentage = completeness.completion_percentage,
                    "Profile completeness checked"
                );
                CompletenessVerdict::Known(completeness)
            }
            Err(e) => {
                warn!(user_id, "Profile completeness unavailable: {e}");
                CompletenessVerdict::Unknown {
                    reason: e.to_string(),
                }
            }
        };

        self.verdicts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), verdict.clone());
        verdict
    }

    /// Last verdict recorded for the user, if any check has run.
    pub fn verdict(&self, user_id: &str) -> Option<CompletenessVerdict> {
        self.verdicts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    /// False until a check has returned a complete verdict.
    pub fn is_complete(&self, user_id: &str) -> bool {
        self.verdict(user_id)
            .map(|v| v.is_complete())
            .unwrap_or(false)
    }

    pub fn missing_fields(&self, user_id: &str) -> Vec<String> {
        self.verdict(user_id)
            .map(|v| v.missing_fields().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::StubBackend;

    fn payload(is_complete: bool, missing: &[&str], pct: f64) -> CompletenessPayload {
        CompletenessPayload {
            is_complete,
            missing_fields: missing.iter().map(|s| s.to_string()).collect(),
            completion_percentage: pct,
            message: None,
        }
    }

    #[test]
    fn test_complete_payload_stays_complete() {
        let p = ProfileCompleteness::from_payload(payload(true, &[], 100.0));
        assert!(p.is_complete);
        assert!(p.missing_fields.is_empty());
        assert_eq!(p.completion_percentage, 100);
    }

    #[test]
    fn test_complete_flag_with_missing_fields_is_incomplete() {
        let p = ProfileCompleteness::from_payload(payload(true, &["Resume"], 87.5));
        assert!(!p.is_complete);
        assert_eq!(p.missing_fields, vec!["Resume"]);
        assert_eq!(p.completion_percentage, 88);
    }

    #[test]
    fn test_incomplete_without_fields_gets_placeholder() {
        let p = ProfileCompleteness::from_payload(payload(false, &[" "], 50.0));
        assert!(!p.is_complete);
        assert_eq!(p.missing_fields, vec![UNSPECIFIED_FIELD]);
    }

    #[test]
    fn test_missing_fields_deduplicated_in_order() {
        let p = ProfileCompleteness::from_payload(payload(
            false,
            &["Phone Number", "Skills", "Phone Number"],
            75.0,
        ));
        assert_eq!(p.missing_fields, vec!["Phone Number", "Skills"]);
    }

    #[test]
    fn test_percentage_clamped() {
        assert_eq!(
            ProfileCompleteness::from_payload(payload(true, &[], 140.0)).completion_percentage,
            100
        );
        assert_eq!(
            ProfileCompleteness::from_payload(payload(false, &["x"], -3.0)).completion_percentage,
            0
        );
    }

    #[test]
    fn test_unknown_verdict_serializes_with_status() {
        let verdict = CompletenessVerdict::Unknown {
            reason: "down".to_string(),
        };
        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["status"], "unknown");
        assert!(!verdict.is_complete());
    }

    #[tokio::test]
    async fn test_gate_defaults_to_unknown_on_fetch_failure() {
        let backend = Arc::new(StubBackend::default());
        backend.set_completeness(None);
        let gate = CompletenessGate::new(backend);

        let verdict = gate.check_completeness("1").await;
        assert!(matches!(verdict, CompletenessVerdict::Unknown { .. }));
        assert!(!gate.is_complete("1"));
        assert!(gate.missing_fields("1").is_empty());
    }

    #[tokio::test]
    async fn test_gate_accessors_reflect_last_check() {
        let backend = Arc::new(StubBackend::default());
        let gate = CompletenessGate::new(backend.clone());
        assert!(!gate.is_complete("1"));

        gate.check_completeness("1").await;
        assert!(gate.is_complete("1"));

        backend.set_completeness(Some(payload(false, &["Skills"], 87.5)));
        gate.check_completeness("1").await;
        assert!(!gate.is_complete("1"));
        assert_eq!(gate.missing_fields("1"), vec!["Skills"]);
        assert_eq!(backend.completeness_calls(), 2);
    }
}
