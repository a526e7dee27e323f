//! Visibility predicates for collection queries
//!
//! A listing is restricted to resources the caller may see by OR-combining
//! the reasons a resource can be visible. Callers fall into four classes,
//! checked in order:
//!
//! | class                 | condition                                   |
//! |-----------------------|---------------------------------------------|
//! | `FullAccess`          | holds the type's full-access permission     |
//! | `AdminAllDeployments` | holds the blanket deployment permission     |
//! | `Authenticated`       | has an id                                   |
//! | `Unauthenticated`     | no id                                       |
//!
//! For vocabulary types this yields:
//!
//! ```text
//! FullAccess           unrestricted
//! AdminAllDeployments  {listed:true} | {createdBy:id} | {belongsToDeployment:{exists:true}}
//! Authenticated        {listed:true} | {createdBy:id} | {belongsToDeployment:{in:own}}
//! Unauthenticated      {listed:true}
//! ```
//!
//! Other types differ only through their [`ResourcePolicy`].

use deploygate_core::{Clause, DeploymentId, OrPredicate, Result, User, UserId};
use serde::Serialize;
use tracing::debug;

use crate::policy::{PolicyTable, ResourceKind, ResourcePolicy};

/// Why a caller sees what it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallerClass {
    /// Sees every resource of the type.
    FullAccess,
    /// Sees every deployment-scoped resource.
    AdminAllDeployments,
    /// Sees what its memberships and authorship allow.
    Authenticated,
    /// Sees what is public.
    Unauthenticated,
}

/// Builds the [`OrPredicate`] restricting a listing of one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPredicateBuilder<'a> {
    table: &'a PolicyTable,
    kind: ResourceKind,
    policy: &'a ResourcePolicy,
}

impl<'a> VisibilityPredicateBuilder<'a> {
    /// Create a builder for `kind`.
    pub fn new(table: &'a PolicyTable, kind: ResourceKind) -> Self {
        Self {
            table,
            kind,
            policy: table.policy(kind),
        }
    }

    /// Classify the caller.
    pub fn caller_class(&self, user: &User) -> CallerClass {
        if self.policy.holds_full_access(user) {
            CallerClass::FullAccess
        } else if self.table.is_admin_all(user) {
            CallerClass::AdminAllDeployments
        } else if user.id.is_some() {
            CallerClass::Authenticated
        } else {
            CallerClass::Unauthenticated
        }
    }

    /// Returns `true` if [`build`](Self::build) reads the caller's own
    /// deployment ids: the private deployments the caller is a member of.
    pub fn needs_own_deployments(&self, user: &User) -> bool {
        self.policy.association.field().is_some()
            && self.caller_class(user) == CallerClass::Authenticated
    }

    /// Returns `true` if [`build`](Self::build) reads the public deployment ids.
    pub fn needs_public_deployments(&self, user: &User) -> bool {
        self.policy.association.field().is_some()
            && self.policy.public_deployments_visible
            && matches!(
                self.caller_class(user),
                CallerClass::Authenticated | CallerClass::Unauthenticated
            )
    }

    /// Build the predicate from already-fetched deployment ids.
    ///
    /// Lists the builder does not need are ignored.
    pub fn build(
        &self,
        user: &User,
        own: &[DeploymentId],
        public: &[DeploymentId],
    ) -> OrPredicate {
        let class = self.caller_class(user);
        if class == CallerClass::FullAccess {
            debug!(kind = %self.kind, "full access, listing unrestricted");
            return OrPredicate::Unrestricted;
        }

        let mut clauses = Vec::new();
        if self.policy.listed_flag {
            clauses.push(Clause::equals("listed", true));
        }
        if self.policy.tracks_creator {
            if let Some(id) = &user.id {
                clauses.push(Clause::equals("createdBy", id.as_str()));
            }
        }
        if let Some(field) = self.policy.association.field() {
            if self.policy.unassociated_visible {
                clauses.push(Clause::exists(field, false));
            }
            match class {
                CallerClass::AdminAllDeployments => clauses.push(Clause::exists(field, true)),
                CallerClass::Authenticated | CallerClass::Unauthenticated => {
                    let include_own = class == CallerClass::Authenticated;
                    let include_public = self.policy.public_deployments_visible;
                    if include_own || include_public {
                        let mut ids: Vec<&DeploymentId> = Vec::new();
                        let own_ids = own.iter().filter(|_| include_own);
                        let public_ids = public.iter().filter(|_| include_public);
                        for id in own_ids.chain(public_ids) {
                            if !ids.contains(&id) {
                                ids.push(id);
                            }
                        }
                        clauses.push(Clause::is_in(field, ids));
                    }
                }
                CallerClass::FullAccess => {}
            }
        }

        debug!(kind = %self.kind, class = ?class, clauses = clauses.len(), "built visibility predicate");
        OrPredicate::AnyOf(clauses)
    }

    /// Build the predicate, calling each fetcher only if its ids are needed.
    pub fn build_with<F, G>(&self, user: &User, fetch_own: F, fetch_public: G) -> Result<OrPredicate>
    where
        F: FnOnce(&UserId) -> Result<Vec<DeploymentId>>,
        G: FnOnce() -> Result<Vec<DeploymentId>>,
    {
        let own = match (&user.id, self.needs_own_deployments(user)) {
            (Some(id), true) => fetch_own(id)?,
            _ => Vec::new(),
        };
        let public = if self.needs_public_deployments(user) {
            fetch_public()?
        } else {
            Vec::new()
        };
        Ok(self.build(user, &own, &public))
    }
}
