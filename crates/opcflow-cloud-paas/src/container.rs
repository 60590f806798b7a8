//! Application containers

use crate::api::ContainerApi;
use crate::error::{PaasError, Result};
use crate::family::{Family, LifecycleContext};
use chrono::{DateTime, Utc};
use opcflow_cloud::{Goal, Interpret, Observed, PollSpec, ReconcileOutcome, RetrySpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle status reported for an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    New,
    Running,
    Failed,
    DestroyPending,
    Destroyed,
    Unknown(String),
}

impl ContainerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerStatus::New => "NEW",
            ContainerStatus::Running => "RUNNING",
            ContainerStatus::Failed => "FAILED",
            ContainerStatus::DestroyPending => "DESTROY_PENDING",
            ContainerStatus::Destroyed => "DESTROYED",
            ContainerStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ContainerStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "NEW" => ContainerStatus::New,
            "RUNNING" => ContainerStatus::Running,
            "FAILED" => ContainerStatus::Failed,
            "DESTROY_PENDING" => ContainerStatus::DestroyPending,
            "DESTROYED" => ContainerStatus::Destroyed,
            _ => ContainerStatus::Unknown(raw),
        }
    }
}

impl From<&str> for ContainerStatus {
    fn from(raw: &str) -> Self {
        ContainerStatus::from(raw.to_string())
    }
}

impl From<ContainerStatus> for String {
    fn from(status: ContainerStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,

    pub status: ContainerStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

/// Create request; `manifest` is the already-expanded API payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApplicationRequest {
    pub name: String,

    #[serde(default)]
    pub manifest: serde_json::Value,
}

impl CreateApplicationRequest {
    pub fn new(name: impl Into<String>, manifest: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            manifest,
        }
    }
}

/// Classifies application states
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerInterpreter;

impl ContainerInterpreter {
    pub fn classify(status: &ContainerStatus, goal: Goal) -> ReconcileOutcome {
        use ContainerStatus::*;

        match (goal, status) {
            (_, Unknown(raw)) => ReconcileOutcome::Unrecognized(raw.clone()),

            (Goal::Ready, Running) => ReconcileOutcome::Done,
            (Goal::Ready, New) => ReconcileOutcome::Continue,
            (Goal::Ready, Failed) => {
                ReconcileOutcome::Fatal("application failed to start".to_string())
            }
            (Goal::Ready, DestroyPending | Destroyed) => {
                ReconcileOutcome::Fatal(format!("application entered {} during creation", status))
            }

            (Goal::Gone, Destroyed) => ReconcileOutcome::Done,
            // a failed application is still torn down
            (Goal::Gone, New | Running | Failed | DestroyPending) => ReconcileOutcome::Continue,
        }
    }
}

impl Interpret<Application> for ContainerInterpreter {
    fn interpret(&self, observed: &Observed<Application>, goal: Goal) -> ReconcileOutcome {
        match observed {
            Observed::Absent if goal == Goal::Ready => ReconcileOutcome::Continue,
            Observed::Absent => ReconcileOutcome::Done,
            Observed::Present(app) => Self::classify(&app.status, goal),
        }
    }
}

/// Create, read and delete for application containers
pub struct Containers<A> {
    api: Arc<A>,
    ctx: LifecycleContext,
}

impl<A: ContainerApi> Containers<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_context(api, LifecycleContext::new(Family::Container))
    }

    pub fn with_context(api: Arc<A>, ctx: LifecycleContext) -> Self {
        Self { api, ctx }
    }

    pub fn context(&self) -> &LifecycleContext {
        &self.ctx
    }

    /// Deploy the application and wait until it is running
    pub async fn create(
        &self,
        request: &CreateApplicationRequest,
        poll: PollSpec,
    ) -> Result<Application> {
        let name = request.name.as_str();
        let api = &*self.api;
        tracing::info!("Creating application {}", name);

        let app = self
            .ctx
            .operation(name)
            .create(
                || api.create_application(request),
                || api.get_application(name),
                &ContainerInterpreter,
                poll,
                || self.remove(name, RetrySpec::default(), PollSpec::default()),
            )
            .await?;
        Ok(app)
    }

    pub async fn read(&self, name: &str) -> Result<Option<Application>> {
        match self.api.get_application(name).await {
            Ok(app) => Ok(Some(app)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(PaasError::CloudError(e)),
        }
    }

    /// Delete the application and wait until it is gone
    pub async fn delete(&self, name: &str, retry: RetrySpec, poll: PollSpec) -> Result<()> {
        tracing::info!("Deleting application {}", name);
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
                || api.delete_application(name),
                || api.get_application(name),
                &ContainerInterpreter,
                retry,
                poll,
            )
            .await
    }
}
