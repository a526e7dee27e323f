//! Deployment-scoped resources
//!
//! The guards only need a narrow view of a resource: which deployments it is
//! associated with, whether it carries a `listed` flag, and who created it.
//! [`ScopedResource`] exposes that view so one engine serves every type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::{DeploymentId, PlatformId, ResourceId, UserId};

/// Access-control view of a resource.
pub trait ScopedResource {
    /// Deployments the resource is associated with; empty when unassociated.
    fn deployment_ids(&self) -> Vec<&DeploymentId>;

    /// Value of the `listed` flag, `None` for types without one.
    fn listed(&self) -> Option<bool> {
        None
    }

    /// Creator of the resource, if recorded.
    fn created_by(&self) -> Option<&UserId> {
        None
    }

    /// JSON document as stored, used to evaluate clauses in memory.
    fn to_document(&self) -> Value;
}

fn listed_default() -> bool {
    true
}

/// A globally registered vocabulary definition (unit, discipline, procedure...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabResource {
    /// Resource id.
    pub id: ResourceId,

    /// Unlisted resources are hidden from general listings. Defaults to `true`.
    #[serde(default = "listed_default")]
    pub listed: bool,

    /// Deployment the resource was registered under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_deployment: Option<DeploymentId>,

    /// User that registered the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl VocabResource {
    /// A listed resource with no deployment and no creator.
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            listed: true,
            belongs_to_deployment: None,
            created_by: None,
        }
    }

    /// Set the listed flag.
    pub fn with_listed(mut self, listed: bool) -> Self {
        self.listed = listed;
        self
    }

    /// Associate with a deployment.
    pub fn in_deployment(mut self, deployment: impl Into<DeploymentId>) -> Self {
        self.belongs_to_deployment = Some(deployment.into());
        self
    }

    /// Record the creator.
    pub fn with_creator(mut self, user: impl Into<UserId>) -> Self {
        self.created_by = Some(user.into());
        self
    }
}

impl ScopedResource for VocabResource {
    fn deployment_ids(&self) -> Vec<&DeploymentId> {
        self.belongs_to_deployment.iter().collect()
    }

    fn listed(&self) -> Option<bool> {
        Some(self.listed)
    }

    fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A platform (station, vehicle, building) hosting sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Platform id.
    pub id: PlatformId,

    /// Deployments the platform is shared with.
    #[serde(default)]
    pub in_deployments: Vec<DeploymentId>,

    /// Platform this platform is mounted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hosted_by: Option<PlatformId>,

    /// User that registered the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl Platform {
    /// A platform in the given deployments.
    pub fn new<I, D>(id: impl Into<PlatformId>, deployments: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DeploymentId>,
    {
        Self {
            id: id.into(),
            in_deployments: deployments.into_iter().map(Into::into).collect(),
            is_hosted_by: None,
            created_by: None,
        }
    }

    /// Mount on a host platform.
    pub fn hosted_by(mut self, host: impl Into<PlatformId>) -> Self {
        self.is_hosted_by = Some(host.into());
        self
    }
}

impl ScopedResource for Platform {
    fn deployment_ids(&self) -> Vec<&DeploymentId> {
        self.in_deployments.iter().collect()
    }

    fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A physical sensor, optionally deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Sensor id.
    pub id: ResourceId,

    /// Deployment the sensor currently belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_deployment: Option<DeploymentId>,
}

impl ScopedResource for Sensor {
    fn deployment_ids(&self) -> Vec<&DeploymentId> {
        self.has_deployment.iter().collect()
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A timeseries of observations, optionally deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeseries {
    /// Timeseries id.
    pub id: ResourceId,

    /// Deployment the observations were made under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_deployment: Option<DeploymentId>,
}

impl ScopedResource for Timeseries {
    fn deployment_ids(&self) -> Vec<&DeploymentId> {
        self.has_deployment.iter().collect()
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// What a check applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckTarget {
    /// Deployment the checked observations belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_deployment: Option<DeploymentId>,
}

/// A quality-control check applied to incoming observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    /// Check id.
    pub id: ResourceId,

    /// Scope the check applies to.
    #[serde(default)]
    pub applies_to: CheckTarget,
}

impl ScopedResource for Check {
    fn deployment_ids(&self) -> Vec<&DeploymentId> {
        self.applies_to.has_deployment.iter().collect()
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
