// Apply Orchestrator: in-flight de-duplication, completeness gating,
// submission, and classification of the backend's answer.

pub mod classify;
pub mod handlers;
pub mod orchestrator;
pub mod registry;
pub mod resolution;

pub use orchestrator::ApplyOrchestrator;
pub use registry::ApplyAttempt;
pub use resolution::ApplyResolution;
