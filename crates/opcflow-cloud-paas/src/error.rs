//! PaaS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaasError {
    #[error("Access rule not found: {rule} on {instance}")]
    AccessRuleNotFound { instance: String, rule: String },

    #[error("Empty response body for {0}")]
    EmptyResponse(String),

    #[error("Lifecycle error: {0}")]
    Reconcile(#[from] opcflow_cloud::ReconcileError),

    #[error("Cloud error: {0}")]
    CloudError(#[from] opcflow_cloud::CloudError),

    #[error("Configuration error: {0}")]
    Config(#[from] opcflow_config::ConfigError),
}

impl PaasError {
    /// True when a failed create left a resource behind that could not be
    /// rolled back automatically.
    pub fn needs_manual_cleanup(&self) -> bool {
        matches!(self, PaasError::Reconcile(e) if e.needs_manual_cleanup())
    }
}

pub type Result<T> = std::result::Result<T, PaasError>;
