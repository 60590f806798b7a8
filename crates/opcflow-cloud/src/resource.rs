//! Resource identity

use serde::{Deserialize, Serialize};

/// Name of a remote resource as the API knows it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ResourceRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
