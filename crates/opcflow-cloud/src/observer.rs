//! Per-call observation hooks for lifecycle operations
//!
//! Orchestrators report progress through a [`LifecycleObserver`] passed in by
//! the caller. [`TracingObserver`] forwards everything to `tracing`; tests and
//! embedders can supply their own.

use crate::error::{CloudError, ReconcileError};
use crate::outcome::{Goal, ReconcileOutcome};

/// Receives lifecycle events for one resource operation
pub trait LifecycleObserver: Send + Sync {
    /// The mutation was accepted by the API
    fn submitted(&self, resource: &str, goal: Goal) {
        let _ = (resource, goal);
    }

    /// A delete submission failed and will be retried
    fn submit_retry(&self, resource: &str, attempt: u32, max_attempts: u32, error: &CloudError) {
        let _ = (resource, attempt, max_attempts, error);
    }

    /// A probe returned and was interpreted
    fn probed(&self, resource: &str, attempt: u32, outcome: &ReconcileOutcome) {
        let _ = (resource, attempt, outcome);
    }

    /// A state the interpreter did not recognize; polling continues
    fn unrecognized(&self, resource: &str, raw: &str) {
        let _ = (resource, raw);
    }

    /// A failed create is about to be rolled back
    fn compensating(&self, resource: &str, cause: &ReconcileError) {
        let _ = (resource, cause);
    }

    /// The goal was reached
    fn settled(&self, resource: &str, goal: Goal, probes: u32) {
        let _ = (resource, goal, probes);
    }
}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn submitted(&self, resource: &str, goal: Goal) {
        tracing::info!("Submitted {} request for {}", goal, resource);
    }

    fn submit_retry(&self, resource: &str, attempt: u32, max_attempts: u32, error: &CloudError) {
        tracing::warn!(
            "Delete submission for {} failed (attempt {}/{}): {}",
            resource,
            attempt,
            max_attempts,
            error
        );
    }

    fn probed(&self, resource: &str, attempt: u32, outcome: &ReconcileOutcome) {
        tracing::debug!("Probe #{} for {}: {:?}", attempt, resource, outcome);
    }

    fn unrecognized(&self, resource: &str, raw: &str) {
        tracing::warn!(
            "Unrecognized status '{}' for {}, treating as in progress",
            raw,
            resource
        );
    }

    fn compensating(&self, resource: &str, cause: &ReconcileError) {
        tracing::warn!("Rolling back {} after failed create: {}", resource, cause);
    }

    fn settled(&self, resource: &str, goal: Goal, probes: u32) {
        tracing::info!("{} is {} after {} probe(s)", resource, goal, probes);
    }
}
