//! Access rules of a service instance
//!
//! The API has no read-by-name: a rule is found by listing every rule of the
//! instance and scanning for its name. Update and delete go to the same PUT
//! endpoint and differ only in the `operation` field of the body. Rule
//! identity is the name; it is re-resolved before every mutation.

use crate::api::AccessRuleApi;
use crate::error::{PaasError, Result};
use crate::family::{Family, LifecycleContext};
use opcflow_cloud::{CloudError, Goal, Interpret, Observed, PollSpec, ReconcileOutcome, RetrySpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether traffic matching the rule is allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleStatus {
    Enabled,
    Disabled,
    Unknown(String),
}

impl RuleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RuleStatus::Enabled => "enabled",
            RuleStatus::Disabled => "disabled",
            RuleStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for RuleStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "enabled" => RuleStatus::Enabled,
            "disabled" => RuleStatus::Disabled,
            _ => RuleStatus::Unknown(raw),
        }
    }
}

impl From<RuleStatus> for String {
    fn from(status: RuleStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An access rule as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    #[serde(rename = "ruleName")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub ports: String,

    pub source: String,

    pub destination: String,

    pub status: RuleStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
}

/// Discriminator for the shared PUT endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperation {
    Update,
    Delete,
}

/// Body of the PUT request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMutation {
    pub operation: RuleOperation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,
}

impl RuleMutation {
    pub fn update(status: RuleStatus) -> Self {
        Self {
            operation: RuleOperation::Update,
            status: Some(status),
        }
    }

    pub fn delete() -> Self {
        Self {
            operation: RuleOperation::Delete,
            status: None,
        }
    }
}

/// Presence is all that matters for rules: listed means created, unlisted
/// means deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessRuleInterpreter;

impl Interpret<AccessRule> for AccessRuleInterpreter {
    fn interpret(&self, observed: &Observed<AccessRule>, goal: Goal) -> ReconcileOutcome {
        match (goal, observed) {
            (Goal::Ready, Observed::Present(_)) => ReconcileOutcome::Done,
            (Goal::Ready, Observed::Absent) => ReconcileOutcome::Continue,
            (Goal::Gone, Observed::Present(_)) => ReconcileOutcome::Continue,
            (Goal::Gone, Observed::Absent) => ReconcileOutcome::Done,
        }
    }
}

/// Access rules of one service instance
pub struct AccessRules<A> {
    api: Arc<A>,
    instance: String,
    ctx: LifecycleContext,
}

impl<A: AccessRuleApi> AccessRules<A> {
    pub fn new(api: Arc<A>, instance: impl Into<String>) -> Self {
        Self::with_context(api, instance, LifecycleContext::new(Family::AccessRule))
    }

    pub fn with_context(api: Arc<A>, instance: impl Into<String>, ctx: LifecycleContext) -> Self {
        Self {
            api,
            instance: instance.into(),
            ctx,
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Find a rule by name. Absence is `Ok(None)`, not an error.
    pub async fn read(&self, name: &str) -> Result<Option<AccessRule>> {
        Ok(self.find(name).await?)
    }

    /// Create the rule and wait until it shows up in the listing
    pub async fn create(&self, rule: &AccessRule, poll: PollSpec) -> Result<AccessRule> {
        let name = rule.name.as_str();
        let api = &*self.api;
        tracing::info!("Creating access rule {} on {}", name, self.instance);

        let created = self
            .ctx
            .operation(name)
            .create(
                || api.create_rule(&self.instance, rule),
                || self.lookup(name),
                &AccessRuleInterpreter,
                poll,
                || self.remove(name, RetrySpec::default(), PollSpec::default()),
            )
            .await?;
        Ok(created)
    }

    /// Change the rule's status. The response body is the new state; no
    /// polling is needed. Without a body the rule is read back by name.
    pub async fn update(&self, name: &str, status: RuleStatus) -> Result<AccessRule> {
        if self.find(name).await?.is_none() {
            return Err(PaasError::AccessRuleNotFound {
                instance: self.instance.clone(),
                rule: name.to_string(),
            });
        }

        tracing::info!(
            "Setting access rule {} on {} to {}",
            name,
            self.instance,
            status
        );
        let updated = self
            .api
            .mutate_rule(&self.instance, name, &RuleMutation::update(status))
            .await?;
        if let Some(rule) = updated {
            return Ok(rule);
        }

        tracing::debug!("Empty update response for {}, reading it back", name);
        self.find(name)
            .await?
            .ok_or_else(|| PaasError::EmptyResponse(format!("access rule {}", name)))
    }

    /// Delete the rule and wait until it is no longer listed. Deleting a rule
    /// that does not exist succeeds.
    pub async fn delete(&self, name: &str, retry: RetrySpec, poll: PollSpec) -> Result<()> {
        if self.find(name).await?.is_none() {
            tracing::debug!("Access rule {} on {} already absent", name, self.instance);
            return Ok(());
        }

        tracing::info!("Deleting access rule {} on {}", name, self.instance);
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
        let instance = self.instance.as_str();
        let mutation = &RuleMutation::delete();

        self.ctx
            .operation(name)
            .delete(
                || async move { api.mutate_rule(instance, name, mutation).await.map(|_| ()) },
                || self.lookup(name),
                &AccessRuleInterpreter,
                retry,
                poll,
            )
            .await
    }

    async fn find(&self, name: &str) -> std::result::Result<Option<AccessRule>, CloudError> {
        let rules = self.api.list_rules(&self.instance).await?;
        Ok(rules.into_iter().find(|rule| rule.name == name))
    }

    /// `find` as a probe: absence becomes not-found
    async fn lookup(&self, name: &str) -> std::result::Result<AccessRule, CloudError> {
        self.find(name).await?.ok_or_else(|| {
            CloudError::ResourceNotFound(format!("access rule {} on {}", name, self.instance))
        })
    }
}
