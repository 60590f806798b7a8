//! Database and middleware service instances
//!
//! Both are provisioned through the same lifecycle and report the same status
//! vocabulary; they differ only in endpoint and timing defaults.

use crate::api::ServiceInstanceApi;
use crate::error::{PaasError, Result};
use crate::family::{Family, LifecycleContext};
use chrono::{DateTime, Utc};
use opcflow_cloud::{Goal, Interpret, Observed, PollSpec, ReconcileOutcome, RetrySpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle status reported for a service instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Configured,
    InProgress,
    Maintenance,
    Running,
    Stopped,
    Terminating,
    Terminated,
    Unknown(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Configured => "Configured",
            InstanceStatus::InProgress => "In Progress",
            InstanceStatus::Maintenance => "Maintenance",
            InstanceStatus::Running => "Running",
            InstanceStatus::Stopped => "Stopped",
            InstanceStatus::Terminating => "Terminating",
            InstanceStatus::Terminated => "Terminated",
            InstanceStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Configured" => InstanceStatus::Configured,
            "In Progress" => InstanceStatus::InProgress,
            "Maintenance" => InstanceStatus::Maintenance,
            "Running" => InstanceStatus::Running,
            "Stopped" => InstanceStatus::Stopped,
            "Terminating" => InstanceStatus::Terminating,
            "Terminated" => InstanceStatus::Terminated,
            _ => InstanceStatus::Unknown(raw),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(raw: &str) -> Self {
        InstanceStatus::from(raw.to_string())
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database or middleware instance as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    #[serde(rename = "serviceName")]
    pub name: String,

    pub status: InstanceStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

/// Create request; `parameters` is the already-expanded API payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    #[serde(rename = "serviceName")]
    pub name: String,

    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl CreateInstanceRequest {
    pub fn new(name: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// Classifies service instance states
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceInstanceInterpreter;

impl ServiceInstanceInterpreter {
    pub fn classify(status: &InstanceStatus, goal: Goal) -> ReconcileOutcome {
        use InstanceStatus::*;

        match (goal, status) {
            (_, Unknown(raw)) => ReconcileOutcome::Unrecognized(raw.clone()),

            (Goal::Ready, Running) => ReconcileOutcome::Done,
            (Goal::Ready, Configured | InProgress | Maintenance) => ReconcileOutcome::Continue,
            (Goal::Ready, Stopped) => {
                ReconcileOutcome::Fatal("instance stopped before becoming ready".to_string())
            }
            (Goal::Ready, Terminating | Terminated) => {
                ReconcileOutcome::Fatal(format!("instance entered {} during creation", status))
            }

            (Goal::Gone, Terminated) => ReconcileOutcome::Done,
            (Goal::Gone, _) => ReconcileOutcome::Continue,
        }
    }
}

impl Interpret<ServiceInstance> for ServiceInstanceInterpreter {
    fn interpret(&self, observed: &Observed<ServiceInstance>, goal: Goal) -> ReconcileOutcome {
        match observed {
            // listings lag behind an accepted create
            Observed::Absent if goal == Goal::Ready => ReconcileOutcome::Continue,
            Observed::Absent => ReconcileOutcome::Done,
            Observed::Present(instance) => Self::classify(&instance.status, goal),
        }
    }
}

/// Create, read and delete for one kind of service instance
pub struct ServiceInstances<A> {
    api: Arc<A>,
    ctx: LifecycleContext,
}

impl<A: ServiceInstanceApi> ServiceInstances<A> {
    pub fn new(api: Arc<A>, ctx: LifecycleContext) -> Self {
        Self { api, ctx }
    }

    pub fn database(api: Arc<A>) -> Self {
        Self::new(api, LifecycleContext::new(Family::Database))
    }

    pub fn middleware(api: Arc<A>) -> Self {
        Self::new(api, LifecycleContext::new(Family::Middleware))
    }

    pub fn context(&self) -> &LifecycleContext {
        &self.ctx
    }

    /// Create the instance and wait until it is running.
    ///
    /// A failure after the request was accepted deletes the instance again;
    /// see [`PaasError::needs_manual_cleanup`].
    pub async fn create(
        &self,
        request: &CreateInstanceRequest,
        poll: PollSpec,
    ) -> Result<ServiceInstance> {
        let name = request.name.as_str();
        let api = &*self.api;
        tracing::info!("Creating {} {}", self.ctx.family(), name);

        let instance = self
            .ctx
            .operation(name)
            .create(
                || api.create_instance(request),
                || api.get_instance(name),
                &ServiceInstanceInterpreter,
                poll,
                || self.remove(name, RetrySpec::default(), PollSpec::default()),
            )
            .await?;
        Ok(instance)
    }

    /// Current state, or `None` if the instance does not exist
    pub async fn read(&self, name: &str) -> Result<Option<ServiceInstance>> {
        match self.api.get_instance(name).await {
            Ok(instance) => Ok(Some(instance)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(PaasError::CloudError(e)),
        }
    }

    /// Delete the instance and wait until it is gone
    pub async fn delete(&self, name: &str, retry: RetrySpec, poll: PollSpec) -> Result<()> {
        tracing::info!("Deleting {} {}", self.ctx.family(), name);
        self.remove(name, retry, poll).await?;
        Ok(())
    }

    async fn remove(
        &self,
        name: &str,
        retry: RetrySpec,
        poll: PollSpec,
    ) -> opcflow_cloud::Result<()> {
        let api = &*self.api;
        self.ctx
            .operation(name)
            .delete(
                || api.delete_instance(name),
                || api.get_instance(name),
                &ServiceInstanceInterpreter,
                retry,
                poll,
            )
            .await
    }
}
