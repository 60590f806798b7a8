//! opcflow lifecycle reconciliation core
//!
//! Cloud PaaS APIs accept a mutation and then provision or tear down the
//! resource in the background. This crate owns the generic part of driving
//! such a resource to a terminal state: submit, poll, classify, and roll back
//! a failed create.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              opcflow-cloud-paas                  │
//! │  database / middleware / container / access rule │
//! │  (status enums, interpreters, defaults, API)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │ submit / probe / compensate closures
//! ┌─────────────────▼───────────────────────────────┐
//! │                 opcflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Operation::create / Operation::delete    │   │
//! │  └───────────────────┬──────────────────────┘   │
//! │  ┌───────────────────▼──────────────────────┐   │
//! │  │  poll_until  (interval, timeout, cancel)  │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The core contains no status strings. Each family supplies an
//! [`Interpret`] implementation that turns an [`Observed`] state into a
//! [`ReconcileOutcome`].

pub mod cancel;
pub mod error;
pub mod observer;
pub mod operation;
pub mod outcome;
pub mod params;
pub mod poller;
pub mod resource;

// Re-exports
pub use cancel::{CancelHandle, Cancellation, Cancelled};
pub use error::{CloudError, ReconcileError, Result};
pub use observer::{LifecycleObserver, TracingObserver};
pub use operation::Operation;
pub use outcome::{Goal, Interpret, Observed, ReconcileOutcome};
pub use params::{LifecycleDefaults, PollSpec, RetrySpec};
pub use poller::{PollError, poll_until};
pub use resource::ResourceRef;
