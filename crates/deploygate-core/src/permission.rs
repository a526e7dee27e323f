//! Global permissions
//!
//! A permission is an opaque capability string issued by the identity provider
//! and carried on the caller's token, independent of any deployment.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Grants the `admin` level on every deployment.
pub const ADMIN_ALL_DEPLOYMENTS: &str = "admin-all:deployments";

/// Create, update and delete any vocabulary resource, and see unlisted ones.
pub const CRUD_VOCAB_RESOURCES: &str = "crud:vocab-resources";

/// Manage every platform regardless of deployment membership.
pub const CRUD_PLATFORMS: &str = "crud:platforms";

/// Manage every check.
pub const CRUD_CHECKS: &str = "crud:checks";

/// Read every sensor, including sensors outside any deployment.
pub const GET_SENSORS: &str = "get:sensors";

/// Read every timeseries, including timeseries outside any deployment.
pub const GET_TIMESERIES: &str = "get:timeseries";

/// Create, update and delete any sensor.
pub const CRUD_SENSORS: &str = "crud:sensors";

/// Create, update and delete any timeseries.
pub const CRUD_TIMESERIES: &str = "crud:timeseries";

/// A single global permission string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Create a new permission.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
