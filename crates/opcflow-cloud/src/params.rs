//! Poll and retry parameters with per-family defaults

use crate::error::{ReconcileError, Result};
use std::time::Duration;

/// How often to probe and how long to wait for a terminal state.
///
/// A zero field means "use the family default" (see [`PollSpec::or`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Fill zero fields from `default`.
    pub fn or(self, default: PollSpec) -> PollSpec {
        PollSpec {
            interval: non_zero_or(self.interval, default.interval),
            timeout: non_zero_or(self.timeout, default.timeout),
        }
    }

    /// Reject specs that would busy-loop or time out before the second probe.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(ReconcileError::InvalidSpec {
                field: "poll interval",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.timeout <= self.interval {
            return Err(ReconcileError::InvalidSpec {
                field: "poll timeout",
                message: format!(
                    "{:?} must be greater than the interval {:?}",
                    self.timeout, self.interval
                ),
            });
        }
        Ok(())
    }
}

/// Bounded retry for the delete submission.
///
/// Zero fields mean "use the family default" (see [`RetrySpec::or`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrySpec {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetrySpec {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Fill zero fields from `default`.
    pub fn or(self, default: RetrySpec) -> RetrySpec {
        RetrySpec {
            max_attempts: if self.max_attempts == 0 {
                default.max_attempts
            } else {
                self.max_attempts
            },
            backoff: non_zero_or(self.backoff, default.backoff),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ReconcileError::InvalidSpec {
                field: "delete attempts",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Defaults a resource family applies when the caller passes zero specs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleDefaults {
    pub poll: PollSpec,
    pub retry: RetrySpec,
}

impl LifecycleDefaults {
    pub const fn new(poll: PollSpec, retry: RetrySpec) -> Self {
        Self { poll, retry }
    }
}

impl Default for LifecycleDefaults {
    fn default() -> Self {
        Self {
            poll: PollSpec::new(Duration::from_secs(10), Duration::from_secs(30 * 60)),
            retry: RetrySpec::new(5, Duration::from_secs(30)),
        }
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() { default } else { value }
}
