//! Single-item visibility
//!
//! Deciding whether one resource is visible takes at most one batched level
//! lookup. [`ResourceOwnershipGuard::assess_visibility`] decides everything
//! that needs no I/O and otherwise names the deployments whose levels are
//! required; [`ResourceOwnershipGuard::check_single_visibility`] finishes the
//! decision once those levels are known.

use deploygate_core::{DeploymentId, Result, ScopeError, ScopedResource, User};
use tracing::debug;

use crate::policy::{PolicyTable, ResourceKind, ResourcePolicy};
use crate::resolver::LevelLookup;

/// Outcome of the I/O-free part of a visibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Visible without further lookups.
    Visible,
    /// Hidden without further lookups.
    Hidden,
    /// Visible iff the caller has a level on any of these deployments.
    RequiresMembership(Vec<DeploymentId>),
}

/// Decides whether a single resource is visible to a caller.
#[derive(Debug, Clone, Copy)]
pub struct ResourceOwnershipGuard<'a> {
    table: &'a PolicyTable,
    kind: ResourceKind,
    policy: &'a ResourcePolicy,
}

impl<'a> ResourceOwnershipGuard<'a> {
    /// Create a guard for `kind`.
    pub fn new(table: &'a PolicyTable, kind: ResourceKind) -> Self {
        Self {
            table,
            kind,
            policy: table.policy(kind),
        }
    }

    /// Decide what can be decided without I/O.
    pub fn assess_visibility<R>(&self, resource: &R, user: &User) -> Visibility
    where
        R: ScopedResource + ?Sized,
    {
        if self.policy.grants_full_access(user) {
            return Visibility::Visible;
        }
        if self.policy.listed_flag && resource.listed() != Some(false) {
            return Visibility::Visible;
        }

        let deployments = resource.deployment_ids();
        if !deployments.is_empty() {
            if self.table.is_admin_all(user) {
                return Visibility::Visible;
            }
            return Visibility::RequiresMembership(deployments.into_iter().cloned().collect());
        }

        if self.policy.unassociated_visible {
            return Visibility::Visible;
        }
        if self.policy.tracks_creator && user.is(resource.created_by()) {
            return Visibility::Visible;
        }
        Visibility::Hidden
    }

    /// Fail with `Forbidden` unless the resource is visible.
    ///
    /// `levels` must hold the lookup for the ids named by
    /// [`Visibility::RequiresMembership`] when the assessment asks for it.
    pub fn check_single_visibility<R>(
        &self,
        resource: &R,
        user: &User,
        levels: Option<&LevelLookup>,
    ) -> Result<()>
    where
        R: ScopedResource + ?Sized,
    {
        match self.assess_visibility(resource, user) {
            Visibility::Visible => Ok(()),
            Visibility::Hidden => Err(self.hidden(user)),
            Visibility::RequiresMembership(ids) => {
                let lookup = levels.ok_or_else(|| {
                    ScopeError::internal(format!(
                        "visibility of a {} resource needs deployment levels",
                        self.kind
                    ))
                })?;
                if ids.iter().any(|id| lookup.level_for(id).is_some()) {
                    Ok(())
                } else {
                    Err(self.hidden(user))
                }
            }
        }
    }

    fn hidden(&self, user: &User) -> ScopeError {
        debug!(kind = %self.kind, user = ?user.id, "resource hidden from caller");
        ScopeError::forbidden(format!(
            "You do not have access to this {} resource",
            self.kind
        ))
    }
}
