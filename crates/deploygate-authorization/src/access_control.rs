//! Async entry point for request handlers
//!
//! The guards are pure; this facade performs the collaborator calls they ask
//! for, one batched call per lookup kind, and hands the results back to them.

use std::sync::Arc;

use deploygate_core::{
    AccessLevel, Deployment, DeploymentFilter, DeploymentId, DeploymentRepository, Filter,
    LevelRepository, OrPredicate, Platform, Result, ScopedResource, SufficientLevels, User,
    UserId,
};
use tracing::{debug, instrument, warn};

use crate::deltas::platforms;
use crate::mutation::{added_deployments, MutationAccess, MutationRightsGuard};
use crate::ownership::{ResourceOwnershipGuard, Visibility};
use crate::permission::GlobalPermissionGuard;
use crate::policy::{PolicyTable, ResourceKind};
use crate::predicate::VisibilityPredicateBuilder;
use crate::resolver::{AccessLevelResolver, LevelLookup};
use crate::snapshot::PolicyStore;

/// Access decisions backed by the deployment and level repositories.
#[derive(Clone)]
pub struct AccessControl {
    deployments: Arc<dyn DeploymentRepository>,
    levels: Arc<dyn LevelRepository>,
    store: Arc<PolicyStore>,
}

impl std::fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControl")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AccessControl {
    /// Create a facade over the two collaborators and a policy store.
    pub fn new(
        deployments: Arc<dyn DeploymentRepository>,
        levels: Arc<dyn LevelRepository>,
        store: Arc<PolicyStore>,
    ) -> Self {
        Self {
            deployments,
            levels,
            store,
        }
    }

    /// The policy store.
    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    /// The active policy table.
    pub fn policy(&self) -> Arc<PolicyTable> {
        self.store.snapshot()
    }

    /// Fetch `deployment` and resolve the caller's level on it.
    #[instrument(skip(self, user, sufficient), fields(user = ?user.id))]
    pub async fn resolve_level(
        &self,
        deployment: &DeploymentId,
        user: &User,
        sufficient: Option<&SufficientLevels>,
    ) -> Result<AccessLevel> {
        let deployment = self.deployments.get_deployment(deployment).await?;
        let table = self.policy();
        AccessLevelResolver::new(&table).resolve_level(&deployment, user, sufficient)
    }

    /// Fetch `deployment` and require the caller's level to be in `allowed`.
    pub async fn require_level(
        &self,
        deployment: &DeploymentId,
        user: &User,
        allowed: &SufficientLevels,
    ) -> Result<AccessLevel> {
        self.resolve_level(deployment, user, Some(allowed)).await
    }

    /// Levels for many deployments in one repository call.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_resolve_levels(
        &self,
        ids: &[DeploymentId],
        user_id: Option<&UserId>,
    ) -> Result<LevelLookup> {
        if ids.is_empty() {
            return Ok(LevelLookup::default());
        }
        let records = self
            .levels
            .get_levels_for_deployments(ids, user_id)
            .await?;
        LevelLookup::from_records(ids, records).map_err(|err| {
            warn!(error = %err, "level repository broke its contract");
            err
        })
    }

    /// Require a global permission.
    pub fn require_permission(&self, user: &User, permission: &str) -> Result<()> {
        GlobalPermissionGuard.require_permission(user, permission)
    }

    /// Visibility restriction for a listing of `kind`.
    #[instrument(skip(self, user), fields(user = ?user.id))]
    pub async fn visibility_predicate(&self, kind: ResourceKind, user: &User) -> Result<OrPredicate> {
        let table = self.policy();
        let builder = VisibilityPredicateBuilder::new(&table, kind);

        let own = match (&user.id, builder.needs_own_deployments(user)) {
            (Some(id), true) => self.deployment_ids(&DeploymentFilter::private_member(id.clone())).await?,
            _ => Vec::new(),
        };
        let public = if builder.needs_public_deployments(user) {
            self.deployment_ids(&DeploymentFilter::public()).await?
        } else {
            Vec::new()
        };
        Ok(builder.build(user, &own, &public))
    }

    /// Visibility restriction ANDed with the request's explicit filter.
    pub async fn listing_filter(
        &self,
        kind: ResourceKind,
        user: &User,
        explicit: Option<Filter>,
    ) -> Result<Option<Filter>> {
        Ok(self.visibility_predicate(kind, user).await?.restrict(explicit))
    }

    /// Fail with `Forbidden` unless `resource` is visible to the caller.
    #[instrument(skip(self, resource, user), fields(user = ?user.id))]
    pub async fn check_visibility<R>(&self, kind: ResourceKind, resource: &R, user: &User) -> Result<()>
    where
        R: ScopedResource + Sync + ?Sized,
    {
        let table = self.policy();
        let guard = ResourceOwnershipGuard::new(&table, kind);
        let levels = match guard.assess_visibility(resource, user) {
            Visibility::RequiresMembership(ids) => {
                debug!(count = ids.len(), "visibility needs deployment levels");
                Some(self.batch_resolve_levels(&ids, user.id.as_ref()).await?)
            }
            _ => None,
        };
        guard.check_single_visibility(resource, user, levels.as_ref())
    }

    /// Authorize creating a resource of `kind`.
    pub fn authorize_create(&self, kind: ResourceKind, user: &User) -> Result<()> {
        let table = self.policy();
        MutationRightsGuard::new(&table, kind).authorize_create(user)
    }

    /// Authorize updating `resource` without changing its deployments.
    #[instrument(skip(self, resource, user), fields(user = ?user.id))]
    pub async fn authorize_update<R>(&self, kind: ResourceKind, resource: &R, user: &User) -> Result<()>
    where
        R: ScopedResource + Sync + ?Sized,
    {
        let table = self.policy();
        let guard = MutationRightsGuard::new(&table, kind);
        let access = guard.assess_update(resource, user);
        self.settle(&guard, access, user).await
    }

    /// Authorize deleting `resource`.
    pub async fn authorize_delete<R>(&self, kind: ResourceKind, resource: &R, user: &User) -> Result<()>
    where
        R: ScopedResource + Sync + ?Sized,
    {
        self.authorize_update(kind, resource, user).await
    }

    /// Authorize an update that moves `current` into `proposed`'s deployments.
    ///
    /// The caller needs update rights on the resource as it is, and editor
    /// rights on every deployment it is added to.
    #[instrument(skip(self, current, proposed, user), fields(user = ?user.id))]
    pub async fn authorize_move<R>(
        &self,
        kind: ResourceKind,
        current: &R,
        proposed: &R,
        user: &User,
    ) -> Result<()>
    where
        R: ScopedResource + Sync + ?Sized,
    {
        self.authorize_update(kind, current, user).await?;

        let table = self.policy();
        let guard = MutationRightsGuard::new(&table, kind);
        let added = added_deployments(current.deployment_ids(), proposed.deployment_ids());
        let access = guard.assess_move(user, &added);
        self.settle(&guard, access, user).await
    }

    /// Authorize a platform update, including moving it between deployments
    /// and re-hosting it on another platform.
    #[instrument(skip_all, fields(platform = %current.id, user = ?user.id))]
    pub async fn authorize_platform_update(
        &self,
        current: &Platform,
        proposed: &Platform,
        new_host: Option<&Platform>,
        user: &User,
    ) -> Result<()> {
        self.authorize_move(platforms::KIND, current, proposed, user)
            .await?;

        if let Some(host) = new_host {
            let table = self.policy();
            let host_deployments = match platforms::assess_rehost(&table, host, user) {
                MutationAccess::RequiresEditorOnAny(ids) => self.fetch_deployments(&ids).await?,
                _ => Vec::new(),
            };
            platforms::authorize_rehost(&table, host, user, &host_deployments)?;
        }
        Ok(())
    }

    /// Authorize listing the platforms of one deployment.
    pub async fn authorize_scoped_platform_listing(
        &self,
        deployment: &DeploymentId,
        user: &User,
    ) -> Result<Filter> {
        let fetched = self.deployments.get_deployment(deployment).await?;
        let table = self.policy();
        platforms::authorize_scoped_listing(&table, &fetched, user)?;
        Ok(platforms::scoped_listing_filter(deployment))
    }

    async fn settle(
        &self,
        guard: &MutationRightsGuard<'_>,
        access: MutationAccess,
        user: &User,
    ) -> Result<()> {
        let deployments = match &access {
            MutationAccess::RequiresEditorOnAny(ids) | MutationAccess::RequiresEditorOnEach(ids) => {
                self.fetch_deployments(ids).await?
            }
            MutationAccess::Allowed | MutationAccess::Denied => Vec::new(),
        };
        guard.finish(access, user, &deployments)
    }

    // One `get_deployment` per id: the repository has no batch-by-id call.
    // Only mutation paths use this; level lookups stay batched.
    async fn fetch_deployments(&self, ids: &[DeploymentId]) -> Result<Vec<Deployment>> {
        let mut fetched = Vec::with_capacity(ids.len());
        for id in ids {
            fetched.push(self.deployments.get_deployment(id).await?);
        }
        Ok(fetched)
    }

    async fn deployment_ids(&self, filter: &DeploymentFilter) -> Result<Vec<DeploymentId>> {
        Ok(self
            .deployments
            .get_deployments(filter)
            .await?
            .into_iter()
            .map(|deployment| deployment.id)
            .collect())
    }
}
