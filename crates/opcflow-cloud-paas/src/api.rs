//! Transport seams for each resource family
//!
//! Implementations own HTTP, authentication and (de)serialization. Absence of
//! a resource must be reported as an error for which
//! [`CloudError::is_not_found`] holds.

use crate::access_rule::{AccessRule, RuleMutation};
use crate::container::{Application, CreateApplicationRequest};
use crate::service_instance::{CreateInstanceRequest, ServiceInstance};
use async_trait::async_trait;
use opcflow_cloud::CloudError;

pub type ApiResult<T> = std::result::Result<T, CloudError>;

/// Database and middleware service instance endpoints
#[async_trait]
pub trait ServiceInstanceApi: Send + Sync {
    async fn create_instance(&self, request: &CreateInstanceRequest) -> ApiResult<()>;

    async fn get_instance(&self, name: &str) -> ApiResult<ServiceInstance>;

    async fn delete_instance(&self, name: &str) -> ApiResult<()>;
}

/// Application container endpoints
#[async_trait]
pub trait ContainerApi: Send + Sync {
    async fn create_application(&self, request: &CreateApplicationRequest) -> ApiResult<()>;

    async fn get_application(&self, name: &str) -> ApiResult<Application>;

    async fn delete_application(&self, name: &str) -> ApiResult<()>;
}

/// Access rule endpoints of a service instance.
///
/// There is no read-by-name: callers list and filter. Update and delete share
/// one PUT endpoint distinguished by [`RuleMutation::operation`].
#[async_trait]
pub trait AccessRuleApi: Send + Sync {
    async fn list_rules(&self, instance: &str) -> ApiResult<Vec<AccessRule>>;

    async fn create_rule(&self, instance: &str, rule: &AccessRule) -> ApiResult<()>;

    /// PUT a mutation; returns the response body when the API sends one
    async fn mutate_rule(
        &self,
        instance: &str,
        rule_name: &str,
        mutation: &RuleMutation,
    ) -> ApiResult<Option<AccessRule>>;
}
