#![allow(dead_code)]

use async_trait::async_trait;
use opcflow_cloud::CloudError;
use opcflow_cloud_paas::{
    AccessRule, AccessRuleApi, ApiResult, Application, ContainerApi, ContainerStatus,
    CreateApplicationRequest, CreateInstanceRequest, InstanceStatus, RuleMutation, RuleOperation,
    RuleStatus, ServiceInstance, ServiceInstanceApi,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// What a GET returns at one point in time
#[derive(Debug, Clone)]
pub enum Step {
    Status(&'static str),
    /// structured 404
    NotFound,
    /// untyped error whose message carries the status code
    NotFoundText,
    ServerError,
}

/// Replays steps in order; the last one repeats
pub struct Timeline {
    steps: Mutex<VecDeque<Step>>,
}

impl Timeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }

    fn next(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(Step::NotFound)
        }
    }

    fn resolve(&self, name: &str) -> ApiResult<&'static str> {
        match self.next() {
            Step::Status(status) => Ok(status),
            Step::NotFound => Err(CloudError::Http {
                status: 404,
                message: format!("{} not found", name),
            }),
            Step::NotFoundText => Err(CloudError::ApiError(format!(
                "GET {} returned 404 Not Found",
                name
            ))),
            Step::ServerError => Err(CloudError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct Calls {
    pub creates: AtomicU32,
    pub gets: AtomicU32,
    pub deletes: AtomicU32,
}

impl Calls {
    pub fn creates(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> u32 {
        self.deletes.load(Ordering::SeqCst)
    }
}

/// Service instance API driven by a timeline
pub struct FakeInstanceApi {
    pub timeline: Timeline,
    pub calls: Calls,
    reject_create: bool,
    delete_failures: AtomicU32,
}

impl FakeInstanceApi {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            timeline: Timeline::new(steps),
            calls: Calls::default(),
            reject_create: false,
            delete_failures: AtomicU32::new(0),
        }
    }

    pub fn rejecting_create(mut self) -> Self {
        self.reject_create = true;
        self
    }

    /// The next `n` delete submissions fail with a 409
    pub fn failing_deletes(self, n: u32) -> Self {
        self.delete_failures.store(n, Ordering::SeqCst);
        self
    }
}

fn consume_failure(remaining: &AtomicU32) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl ServiceInstanceApi for FakeInstanceApi {
    async fn create_instance(&self, request: &CreateInstanceRequest) -> ApiResult<()> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        if self.reject_create {
            return Err(CloudError::Http {
                status: 400,
                message: format!("invalid shape for {}", request.name),
            });
        }
        Ok(())
    }

    async fn get_instance(&self, name: &str) -> ApiResult<ServiceInstance> {
        self.calls.gets.fetch_add(1, Ordering::SeqCst);
        let status = self.timeline.resolve(name)?;
        Ok(ServiceInstance {
            name: name.to_string(),
            status: InstanceStatus::from(status),
            shape: Some("oc3".to_string()),
            edition: None,
            creation_time: None,
        })
    }

    async fn delete_instance(&self, _name: &str) -> ApiResult<()> {
        self.calls.deletes.fetch_add(1, Ordering::SeqCst);
        if consume_failure(&self.delete_failures) {
            return Err(CloudError::ApiError(
                "409 Conflict: instance is locked by another operation".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application container API driven by a timeline
pub struct FakeContainerApi {
    pub timeline: Timeline,
    pub calls: Calls,
    delete_failures: AtomicU32,
}

impl FakeContainerApi {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            timeline: Timeline::new(steps),
            calls: Calls::default(),
            delete_failures: AtomicU32::new(0),
        }
    }

    pub fn failing_deletes(self, n: u32) -> Self {
        self.delete_failures.store(n, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ContainerApi for FakeContainerApi {
    async fn create_application(&self, _request: &CreateApplicationRequest) -> ApiResult<()> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_application(&self, name: &str) -> ApiResult<Application> {
        self.calls.gets.fetch_add(1, Ordering::SeqCst);
        let status = self.timeline.resolve(name)?;
        Ok(Application {
            name: name.to_string(),
            status: ContainerStatus::from(status),
            web_url: None,
            created_time: None,
        })
    }

    async fn delete_application(&self, _name: &str) -> ApiResult<()> {
        self.calls.deletes.fetch_add(1, Ordering::SeqCst);
        if consume_failure(&self.delete_failures) {
            return Err(CloudError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Access rule API backed by an in-memory list.
///
/// Created rules become visible after `visibility_lag` further listings and
/// deleted rules disappear after the same lag.
pub struct FakeRuleApi {
    rules: Mutex<Vec<AccessRule>>,
    pending: Mutex<Vec<(u32, Pending)>>,
    visibility_lag: u32,
    empty_update_body: bool,
    pub lists: AtomicU32,
    pub mutations: Mutex<Vec<(String, RuleMutation)>>,
}

enum Pending {
    Add(AccessRule),
    Remove(String),
}

impl FakeRuleApi {
    pub fn new(rules: Vec<AccessRule>, visibility_lag: u32) -> Self {
        Self {
            rules: Mutex::new(rules),
            pending: Mutex::new(Vec::new()),
            visibility_lag,
            empty_update_body: false,
            lists: AtomicU32::new(0),
            mutations: Mutex::new(Vec::new()),
        }
    }

    /// Apply updates but answer them without a body
    pub fn without_update_body(mut self) -> Self {
        self.empty_update_body = true;
        self
    }

    pub fn lists(&self) -> u32 {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> Vec<(String, RuleMutation)> {
        self.mutations.lock().unwrap().clone()
    }

    fn schedule(&self, change: Pending) {
        self.pending
            .lock()
            .unwrap()
            .push((self.visibility_lag, change));
    }

    fn settle(&self) {
        let mut pending = self.pending.lock().unwrap();
        let mut rules = self.rules.lock().unwrap();
        pending.retain_mut(|(wait, change)| {
            if *wait > 0 {
                *wait -= 1;
                return true;
            }
            match change {
                Pending::Add(rule) => rules.push(rule.clone()),
                Pending::Remove(name) => rules.retain(|r| &r.name != name),
            }
            false
        });
    }
}

#[async_trait]
impl AccessRuleApi for FakeRuleApi {
    async fn list_rules(&self, _instance: &str) -> ApiResult<Vec<AccessRule>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.settle();
        Ok(self.rules.lock().unwrap().clone())
    }

    async fn create_rule(&self, _instance: &str, rule: &AccessRule) -> ApiResult<()> {
        self.schedule(Pending::Add(rule.clone()));
        Ok(())
    }

    async fn mutate_rule(
        &self,
        _instance: &str,
        rule_name: &str,
        mutation: &RuleMutation,
    ) -> ApiResult<Option<AccessRule>> {
        self.mutations
            .lock()
            .unwrap()
            .push((rule_name.to_string(), mutation.clone()));

        match mutation.operation {
            RuleOperation::Update => {
                let mut rules = self.rules.lock().unwrap();
                let rule = rules
                    .iter_mut()
                    .find(|r| r.name == rule_name)
                    .ok_or_else(|| CloudError::ResourceNotFound(rule_name.to_string()))?;
                if let Some(status) = &mutation.status {
                    rule.status = status.clone();
                }
                if self.empty_update_body {
                    return Ok(None);
                }
                Ok(Some(rule.clone()))
            }
            RuleOperation::Delete => {
                self.schedule(Pending::Remove(rule_name.to_string()));
                Ok(None)
            }
        }
    }
}

pub fn rule(name: &str) -> AccessRule {
    AccessRule {
        name: name.to_string(),
        description: "test rule".to_string(),
        ports: "1521".to_string(),
        source: "PUBLIC-INTERNET".to_string(),
        destination: "DB".to_string(),
        status: RuleStatus::Enabled,
        rule_type: Some("USER".to_string()),
    }
}
