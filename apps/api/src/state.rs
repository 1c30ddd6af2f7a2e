use std::sync::Arc;
use std::time::Duration;

use crate::apply::ApplyOrchestrator;
use crate::backend::JobBoardBackend;
use crate::ledger::ApplicationLedger;
use crate::profile::CompletenessGate;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn JobBoardBackend>,
    pub gate: Arc<CompletenessGate>,
    pub ledger: Arc<ApplicationLedger>,
    /// One orchestrator per process; it owns the in-flight registry.
    pub orchestrator: Arc<ApplyOrchestrator>,
}

impl AppState {
    pub fn new(backend: Arc<dyn JobBoardBackend>, apply_timeout: Option<Duration>) -> Self {
        let gate = Arc::new(CompletenessGate::new(backend.clone()));
        let ledger = Arc::new(ApplicationLedger::new(backend.clone()));
        let orchestrator = Arc::new(
            ApplyOrchestrator::new(backend.clone(), gate.clone(), ledger.clone())
                .with_timeout(apply_timeout),
        );

        Self {
            backend,
            gate,
            ledger,
            orchestrator,
        }
    }
}
