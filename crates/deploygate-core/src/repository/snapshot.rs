//! In-memory repository over a fixed set of deployments
//!
//! Used by the CLI to explain decisions offline and by tests. It honours the
//! [`LevelRepository`] contract exactly, including the "public is basic" rule.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DeploymentRepository, LevelRepository};
use crate::access_level::AccessLevel;
use crate::deployment::{Deployment, DeploymentFilter, DeploymentLevelRecord};
use crate::errors::{Result, ScopeError};
use crate::identifiers::{DeploymentId, UserId};

/// Read-only deployment store held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Deployment>", into = "Vec<Deployment>")]
pub struct SnapshotRepository {
    deployments: BTreeMap<DeploymentId, Deployment>,
}

impl SnapshotRepository {
    /// Build a repository from deployments; later duplicates replace earlier ones.
    pub fn new(deployments: impl IntoIterator<Item = Deployment>) -> Self {
        Self {
            deployments: deployments
                .into_iter()
                .map(|deployment| (deployment.id.clone(), deployment))
                .collect(),
        }
    }

    /// Parse a JSON array of deployments.
    pub fn from_json(json: &str) -> Result<Self> {
        let deployments: Vec<Deployment> = serde_json::from_str(json)
            .map_err(|e| ScopeError::invalid(format!("Invalid deployments JSON: {e}")))?;
        Ok(Self::new(deployments))
    }

    /// Number of deployments held.
    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    /// Returns `true` if no deployment is held.
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }

    fn level_for(deployment: &Deployment, user_id: Option<&UserId>) -> Option<AccessLevel> {
        if deployment.public {
            return Some(AccessLevel::Basic);
        }
        user_id.and_then(|id| deployment.member_level(id))
    }
}

impl From<Vec<Deployment>> for SnapshotRepository {
    fn from(value: Vec<Deployment>) -> Self {
        Self::new(value)
    }
}

impl From<SnapshotRepository> for Vec<Deployment> {
    fn from(value: SnapshotRepository) -> Self {
        value.deployments.into_values().collect()
    }
}

#[async_trait]
impl DeploymentRepository for SnapshotRepository {
    async fn get_deployment(&self, id: &DeploymentId) -> Result<Deployment> {
        self.deployments
            .get(id)
            .cloned()
            .ok_or_else(|| ScopeError::not_found(format!("deployment '{id}'")))
    }

    async fn get_deployments(&self, filter: &DeploymentFilter) -> Result<Vec<Deployment>> {
        Ok(self
            .deployments
            .values()
            .filter(|deployment| filter.matches(deployment))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LevelRepository for SnapshotRepository {
    async fn get_levels_for_deployments(
        &self,
        ids: &[DeploymentId],
        user_id: Option<&UserId>,
    ) -> Result<Vec<DeploymentLevelRecord>> {
        ids.iter()
            .map(|id| {
                let deployment = self
                    .deployments
                    .get(id)
                    .ok_or_else(|| ScopeError::not_found(format!("deployment '{id}'")))?;
                Ok(DeploymentLevelRecord {
                    deployment_id: id.clone(),
                    level: Self::level_for(deployment, user_id),
                })
            })
            .collect()
    }
}
