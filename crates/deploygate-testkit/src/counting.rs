//! Repository wrapper that counts collaborator calls
//!
//! Lets tests assert that a decision issued exactly one batched lookup
//! instead of one call per deployment.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use deploygate_core::{
    Deployment, DeploymentFilter, DeploymentId, DeploymentLevelRecord, DeploymentRepository,
    LevelRepository, Result, UserId,
};

/// Number of calls made to each collaborator method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `get_deployment` calls.
    pub get_deployment: usize,
    /// `get_deployments` calls.
    pub get_deployments: usize,
    /// `get_levels_for_deployments` calls.
    pub get_levels_for_deployments: usize,
}

impl CallCounts {
    /// Total number of calls.
    pub fn total(&self) -> usize {
        self.get_deployment + self.get_deployments + self.get_levels_for_deployments
    }
}

/// Wraps a repository and counts every call made through it.
#[derive(Debug, Default)]
pub struct CountingRepository<R> {
    inner: R,
    get_deployment: AtomicUsize,
    get_deployments: AtomicUsize,
    get_levels_for_deployments: AtomicUsize,
}

impl<R> CountingRepository<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            get_deployment: AtomicUsize::new(0),
            get_deployments: AtomicUsize::new(0),
            get_levels_for_deployments: AtomicUsize::new(0),
        }
    }

    /// Calls made so far.
    pub fn counts(&self) -> CallCounts {
        CallCounts {
            get_deployment: self.get_deployment.load(Ordering::SeqCst),
            get_deployments: self.get_deployments.load(Ordering::SeqCst),
            get_levels_for_deployments: self.get_levels_for_deployments.load(Ordering::SeqCst),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.get_deployment.store(0, Ordering::SeqCst);
        self.get_deployments.store(0, Ordering::SeqCst);
        self.get_levels_for_deployments.store(0, Ordering::SeqCst);
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: DeploymentRepository> DeploymentRepository for CountingRepository<R> {
    async fn get_deployment(&self, id: &DeploymentId) -> Result<Deployment> {
        self.get_deployment.fetch_add(1, Ordering::SeqCst);
        self.inner.get_deployment(id).await
    }

    async fn get_deployments(&self, filter: &DeploymentFilter) -> Result<Vec<Deployment>> {
        self.get_deployments.fetch_add(1, Ordering::SeqCst);
        self.inner.get_deployments(filter).await
    }
}

#[async_trait]
impl<R: LevelRepository> LevelRepository for CountingRepository<R> {
    async fn get_levels_for_deployments(
        &self,
        ids: &[DeploymentId],
        user_id: Option<&UserId>,
    ) -> Result<Vec<DeploymentLevelRecord>> {
        self.get_levels_for_deployments
            .fetch_add(1, Ordering::SeqCst);
        self.inner.get_levels_for_deployments(ids, user_id).await
    }
}
