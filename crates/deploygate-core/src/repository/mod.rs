//! Collaborator interfaces
//!
//! The engine performs no I/O of its own. A gateway controller implements
//! these traits on top of its resource repository (the event-bus RPC in
//! production) and the `AccessControl` facade calls them before invoking the
//! pure guards. Implementations own retries and cancellation.

use async_trait::async_trait;

use crate::deployment::{Deployment, DeploymentFilter, DeploymentLevelRecord};
use crate::errors::Result;
use crate::identifiers::{DeploymentId, UserId};

mod snapshot;

pub use snapshot::SnapshotRepository;

/// Deployment lookups.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Fetch one deployment, failing with `NotFound` if it does not exist.
    async fn get_deployment(&self, id: &DeploymentId) -> Result<Deployment>;

    /// Fetch every deployment matching the filter.
    async fn get_deployments(&self, filter: &DeploymentFilter) -> Result<Vec<Deployment>>;
}

/// Batched level lookups.
///
/// Contract for [`LevelRepository::get_levels_for_deployments`]:
///
/// - exactly one record per input id, in input order;
/// - `level = basic` whenever the deployment is public, regardless of `user_id`;
/// - `level = None` when the deployment is private and the caller is not a member;
/// - the call fails as a whole (no partial results) if any id does not exist.
#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// Resolve the caller's level for each deployment in one call.
    async fn get_levels_for_deployments(
        &self,
        ids: &[DeploymentId],
        user_id: Option<&UserId>,
    ) -> Result<Vec<DeploymentLevelRecord>>;
}
