//! Fixed-interval status poller

use crate::cancel::{Cancellation, deadline_after};
use crate::params::PollSpec;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Why polling stopped without a result
#[derive(Debug)]
pub enum PollError<E> {
    /// The probe reported an error; it is not retried here
    Probe(E),
    /// No terminal result before the timeout
    Timeout { elapsed: Duration },
    Cancelled,
}

/// Call `probe` immediately and then every `spec.interval` until it yields
/// `Some`, fails, or `spec.timeout` elapses.
///
/// No probe is started after the deadline, and a probe still running at the
/// deadline is dropped. Every wait races `cancel`.
pub async fn poll_until<T, E, F, Fut>(
    spec: PollSpec,
    cancel: &Cancellation,
    mut probe: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let deadline = deadline_after(started, spec.timeout);

    loop {
        if Instant::now() >= deadline {
            return Err(PollError::Timeout {
                elapsed: started.elapsed(),
            });
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = tokio::time::timeout_at(deadline, probe()) => result,
        };

        match result {
            Err(_) => {
                return Err(PollError::Timeout {
                    elapsed: started.elapsed(),
                });
            }
            Ok(Err(e)) => return Err(PollError::Probe(e)),
            Ok(Ok(Some(value))) => return Ok(value),
            Ok(Ok(None)) => {}
        }

        let next = deadline_after(Instant::now(), spec.interval).min(deadline);
        if cancel.sleep_until(next).await.is_err() {
            return Err(PollError::Cancelled);
        }
    }
}
