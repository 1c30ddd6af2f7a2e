// Profile Completeness Gate: consulted before any apply attempt is submitted.

pub mod completeness;
pub mod handlers;

pub use completeness::{CompletenessGate, CompletenessVerdict};
