//! Platforms
//!
//! Platforms carry no `listed` flag and belong to any number of deployments
//! through `inDeployments`. A platform is visible when the caller can access
//! at least one of them. Hosting a platform on another one additionally
//! requires editor rights on a deployment of the host.

use deploygate_core::{
    AccessLevel, Clause, Deployment, DeploymentId, Filter, Platform, Result, ScopeError, User,
};
use tracing::debug;

use crate::mutation::{added_deployments, MutationAccess, MutationRightsGuard};
use crate::ownership::{ResourceOwnershipGuard, Visibility};
use crate::policy::{PolicyTable, ResourceKind};
use crate::resolver::AccessLevelResolver;

/// Policy table entry used for platforms.
pub const KIND: ResourceKind = ResourceKind::Platforms;

const IN_DEPLOYMENTS: &str = "inDeployments";

/// I/O-free visibility of a single platform.
pub fn assess(table: &PolicyTable, platform: &Platform, user: &User) -> Visibility {
    ResourceOwnershipGuard::new(table, KIND).assess_visibility(platform, user)
}

/// Authorize listing the platforms of one deployment (`?inDeployment=X`).
///
/// Any level on the deployment suffices.
pub fn authorize_scoped_listing(
    table: &PolicyTable,
    deployment: &Deployment,
    user: &User,
) -> Result<AccessLevel> {
    AccessLevelResolver::new(table).resolve_level(deployment, user, None)
}

/// Filter selecting the platforms of one deployment.
pub fn scoped_listing_filter(deployment: &DeploymentId) -> Filter {
    Filter::Clause(Clause::equals(IN_DEPLOYMENTS, deployment.as_str()))
}

/// Decide what can be decided about an update from `current` to `proposed`
/// without I/O. Only deployments the platform is being added to are checked.
pub fn assess_deployment_change(
    table: &PolicyTable,
    current: &Platform,
    proposed: &Platform,
    user: &User,
) -> MutationAccess {
    let added = added_deployments(&current.in_deployments, &proposed.in_deployments);
    MutationRightsGuard::new(table, KIND).assess_move(user, &added)
}

/// Decide what can be decided about hosting a platform on `host` without I/O.
pub fn assess_rehost(table: &PolicyTable, host: &Platform, user: &User) -> MutationAccess {
    if table.policy(KIND).grants_management(user) {
        return MutationAccess::Allowed;
    }
    if host.in_deployments.is_empty() {
        debug!(host = %host.id, "host platform belongs to no deployment");
        return MutationAccess::Denied;
    }
    MutationAccess::RequiresEditorOnAny(host.in_deployments.clone())
}

/// Authorize hosting a platform on `host`, given the host's deployments.
pub fn authorize_rehost(
    table: &PolicyTable,
    host: &Platform,
    user: &User,
    host_deployments: &[Deployment],
) -> Result<()> {
    match assess_rehost(table, host, user) {
        MutationAccess::Denied => Err(ScopeError::forbidden(format!(
            "You cannot host a platform on '{}'",
            host.id
        ))),
        access => MutationRightsGuard::new(table, KIND).finish(access, user, host_deployments),
    }
}
