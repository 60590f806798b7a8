//! Create and delete orchestration for a single resource
//!
//! An [`Operation`] binds one resource to its family defaults, a cancellation
//! signal and an observer. [`Operation::create`] submits, polls until the
//! interpreter reports `Done`, and rolls back on any failure after the
//! submission was accepted. [`Operation::delete`] retries the submission,
//! then polls until the resource is absent or reported gone.

use crate::cancel::Cancellation;
use crate::error::{CloudError, ReconcileError, Result};
use crate::observer::{LifecycleObserver, TracingObserver};
use crate::outcome::{Goal, Interpret, Observed, ReconcileOutcome};
use crate::params::{LifecycleDefaults, PollSpec, RetrySpec};
use crate::poller::{PollError, poll_until};
use crate::resource::ResourceRef;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// Lifecycle operation on one resource
#[derive(Clone)]
pub struct Operation {
    kind: &'static str,
    resource: ResourceRef,
    defaults: LifecycleDefaults,
    cancel: Cancellation,
    observer: Arc<dyn LifecycleObserver>,
}

/// Why a single probe ended polling early
enum Stop {
    Transport(CloudError),
    Fatal(String),
}

impl Operation {
    pub fn new(
        kind: &'static str,
        resource: impl Into<ResourceRef>,
        defaults: LifecycleDefaults,
    ) -> Self {
        Self {
            kind,
            resource: resource.into(),
            defaults,
            cancel: Cancellation::never(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn defaults(&self) -> LifecycleDefaults {
        self.defaults
    }

    /// Submit a create and wait for the resource to become ready.
    ///
    /// A failed submission returns [`ReconcileError::SubmissionFailed`]
    /// without polling or compensating. Any failure after that runs
    /// `compensate` exactly once and returns either
    /// [`ReconcileError::RolledBack`] or
    /// [`ReconcileError::CompensationFailed`] wrapping the original cause.
    pub async fn create<S, Sub, SubFut, P, PFut, I, C, CFut>(
        &self,
        submit: Sub,
        probe: P,
        interpreter: &I,
        poll: PollSpec,
        compensate: C,
    ) -> Result<S>
    where
        Sub: FnOnce() -> SubFut,
        SubFut: Future<Output = std::result::Result<(), CloudError>>,
        P: FnMut() -> PFut,
        PFut: Future<Output = std::result::Result<S, CloudError>>,
        I: Interpret<S> + ?Sized,
        C: FnOnce() -> CFut,
        CFut: Future<Output = Result<()>>,
    {
        let span = tracing::info_span!(
            "reconcile",
            op = "create",
            kind = self.kind,
            resource = %self.resource
        );

        async move {
            let poll = poll.or(self.defaults.poll);
            poll.validate()?;

            if let Err(source) = submit().await {
                return Err(ReconcileError::SubmissionFailed {
                    resource: self.resource.to_string(),
                    source,
                });
            }
            self.observer.submitted(self.resource.as_str(), Goal::Ready);

            let cause = match self.wait_for(Goal::Ready, poll, probe, interpreter).await {
                Ok(Observed::Present(state)) => return Ok(state),
                Ok(Observed::Absent) => ReconcileError::InterpretedFatal {
                    resource: self.resource.to_string(),
                    reason: "reported ready while the resource does not exist".to_string(),
                },
                Err(cause) => cause,
            };

            self.observer.compensating(self.resource.as_str(), &cause);
            match compensate().await {
                Ok(()) => Err(ReconcileError::RolledBack {
                    cause: Box::new(cause),
                }),
                Err(compensation) => Err(ReconcileError::CompensationFailed {
                    cause: Box::new(cause),
                    compensation: Box::new(compensation),
                }),
            }
        }
        .instrument(span)
        .await
    }

    /// Submit a delete, retrying the submission, and wait until the resource
    /// is gone.
    ///
    /// Not-found from either the submission or a probe counts as success.
    pub async fn delete<S, Sub, SubFut, P, PFut, I>(
        &self,
        mut submit: Sub,
        probe: P,
        interpreter: &I,
        retry: RetrySpec,
        poll: PollSpec,
    ) -> Result<()>
    where
        Sub: FnMut() -> SubFut,
        SubFut: Future<Output = std::result::Result<(), CloudError>>,
        P: FnMut() -> PFut,
        PFut: Future<Output = std::result::Result<S, CloudError>>,
        I: Interpret<S> + ?Sized,
    {
        let span = tracing::info_span!(
            "reconcile",
            op = "delete",
            kind = self.kind,
            resource = %self.resource
        );

        async move {
            let retry = retry.or(self.defaults.retry);
            retry.validate()?;
            let poll = poll.or(self.defaults.poll);
            poll.validate()?;

            let mut attempt = 0;
            loop {
                attempt += 1;
                match submit().await {
                    Ok(()) => break,
                    Err(e) if e.is_not_found() => {
                        tracing::debug!("{} already absent at delete submission", self.resource);
                        self.observer.settled(self.resource.as_str(), Goal::Gone, 0);
                        return Ok(());
                    }
                    Err(source) if attempt >= retry.max_attempts => {
                        return Err(ReconcileError::DeleteRetryExhausted {
                            resource: self.resource.to_string(),
                            attempts: attempt,
                            source,
                        });
                    }
                    Err(e) => {
                        self.observer.submit_retry(
                            self.resource.as_str(),
                            attempt,
                            retry.max_attempts,
                            &e,
                        );
                        if self.cancel.sleep(retry.backoff).await.is_err() {
                            return Err(self.cancelled());
                        }
                    }
                }
            }
            self.observer.submitted(self.resource.as_str(), Goal::Gone);

            self.wait_for(Goal::Gone, poll, probe, interpreter)
                .await
                .map(|_| ())
        }
        .instrument(span)
        .await
    }

    /// Poll until `goal` is reached. Not-found is normalized to
    /// [`Observed::Absent`] and always satisfies [`Goal::Gone`].
    async fn wait_for<S, P, PFut, I>(
        &self,
        goal: Goal,
        poll: PollSpec,
        mut probe: P,
        interpreter: &I,
    ) -> Result<Observed<S>>
    where
        P: FnMut() -> PFut,
        PFut: Future<Output = std::result::Result<S, CloudError>>,
        I: Interpret<S> + ?Sized,
    {
        let resource = self.resource.as_str();
        let observer = &*self.observer;
        let mut probes = 0u32;

        let result = poll_until(poll, &self.cancel, || {
            probes += 1;
            let attempt = probes;
            let fetched = probe();
            async move {
                let observed = match fetched.await {
                    Ok(state) => Observed::Present(state),
                    Err(e) if e.is_not_found() => Observed::Absent,
                    Err(e) => return Err(Stop::Transport(e)),
                };

                let outcome = if goal == Goal::Gone && observed.is_absent() {
                    ReconcileOutcome::Done
                } else {
                    interpreter.interpret(&observed, goal)
                };
                observer.probed(resource, attempt, &outcome);

                match outcome {
                    ReconcileOutcome::Done => Ok(Some(observed)),
                    ReconcileOutcome::Continue => Ok(None),
                    ReconcileOutcome::Unrecognized(raw) => {
                        observer.unrecognized(resource, &raw);
                        Ok(None)
                    }
                    ReconcileOutcome::Fatal(reason) => Err(Stop::Fatal(reason)),
                }
            }
        })
        .await;

        match result {
            Ok(observed) => {
                self.observer.settled(resource, goal, probes);
                Ok(observed)
            }
            Err(PollError::Probe(Stop::Transport(source))) => Err(ReconcileError::ProbeFailed {
                resource: resource.to_string(),
                source,
            }),
            Err(PollError::Probe(Stop::Fatal(reason))) => Err(ReconcileError::InterpretedFatal {
                resource: resource.to_string(),
                reason,
            }),
            Err(PollError::Timeout { .. }) => Err(ReconcileError::PollTimeout {
                resource: resource.to_string(),
                goal,
                timeout: poll.timeout,
            }),
            Err(PollError::Cancelled) => Err(self.cancelled()),
        }
    }

    fn cancelled(&self) -> ReconcileError {
        ReconcileError::Cancelled {
            resource: self.resource.to_string(),
        }
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind)
            .field("resource", &self.resource)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
