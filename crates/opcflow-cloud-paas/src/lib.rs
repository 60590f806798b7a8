//! PaaS resource families for opcflow
//!
//! This crate maps database instances, middleware instances, application
//! containers and access rules onto the lifecycle core in `opcflow-cloud`.
//! Each family owns its status vocabulary, its interpreter and its timing
//! defaults; transport is supplied through the traits in [`api`].
//!
//! # Families
//!
//! - **Database / middleware instances**: `Configured`, `In Progress`,
//!   `Maintenance`, `Running`, `Stopped`, `Terminating`, `Terminated`
//! - **Application containers**: `NEW`, `RUNNING`, `FAILED`,
//!   `DESTROY_PENDING`, `DESTROYED`
//! - **Access rules**: listed or not listed; `enabled` / `disabled`
//!
//! # Example
//!
//! ```ignore
//! use opcflow_cloud::PollSpec;
//! use opcflow_cloud_paas::{CreateInstanceRequest, ServiceInstances};
//!
//! let databases = ServiceInstances::database(api);
//!
//! // zero spec: 60s interval, 120min timeout
//! let instance = databases
//!     .create(&CreateInstanceRequest::new("orders-db", params), PollSpec::default())
//!     .await?;
//! ```

pub mod access_rule;
pub mod api;
pub mod container;
pub mod error;
pub mod family;
pub mod service_instance;

pub use access_rule::{
    AccessRule, AccessRuleInterpreter, AccessRules, RuleMutation, RuleOperation, RuleStatus,
};
pub use api::{AccessRuleApi, ApiResult, ContainerApi, ServiceInstanceApi};
pub use container::{
    Application, ContainerInterpreter, ContainerStatus, Containers, CreateApplicationRequest,
};
pub use error::{PaasError, Result};
pub use family::{Family, LifecycleContext};
pub use service_instance::{
    CreateInstanceRequest, InstanceStatus, ServiceInstance, ServiceInstanceInterpreter,
    ServiceInstances,
};
