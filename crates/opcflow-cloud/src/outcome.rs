//! Outcome of interpreting an observed resource state

use serde::{Deserialize, Serialize};

/// What the caller is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// The resource exists and is usable
    Ready,
    /// The resource no longer exists
    Gone,
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goal::Ready => write!(f, "ready"),
            Goal::Gone => write!(f, "gone"),
        }
    }
}

/// Result of one probe, after not-found has been normalized away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed<S> {
    Present(S),
    Absent,
}

impl<S> Observed<S> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Observed::Absent)
    }
}

/// Classification of an observed state against a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum ReconcileOutcome {
    /// Goal reached; stop polling
    Done,
    /// Known transitional state; keep polling
    Continue,
    /// State the interpreter does not recognize. Polling continues and the
    /// raw value is reported to the observer.
    Unrecognized(String),
    /// Terminal bad state; stop polling
    Fatal(String),
}

impl ReconcileOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconcileOutcome::Done | ReconcileOutcome::Fatal(_))
    }
}

/// Per-family mapping from an observed state to an outcome.
///
/// Implementations must be pure: no I/O, no clock, same input same output.
pub trait Interpret<S>: Send + Sync {
    fn interpret(&self, observed: &Observed<S>, goal: Goal) -> ReconcileOutcome;
}

impl<S, F> Interpret<S> for F
where
    F: Fn(&Observed<S>, Goal) -> ReconcileOutcome + Send + Sync,
{
    fn interpret(&self, observed: &Observed<S>, goal: Goal) -> ReconcileOutcome {
        self(observed, goal)
    }
}
