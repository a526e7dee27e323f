//! Create, update and delete rights
//!
//! ```text
//! create          manage permission
//! update/delete   manage permission | creator | editor level on the resource's deployment(s)
//! move            editor level on every deployment the resource is moved into
//! ```
//!
//! Holders of the manage permission skip the move check; creators do not.

use deploygate_core::{Deployment, DeploymentId, Result, ScopeError, ScopedResource, User};
use tracing::debug;

use crate::permission::GlobalPermissionGuard;
use crate::policy::{PolicyTable, ResourceKind, ResourcePolicy};
use crate::sufficiency::LevelSufficiencyGuard;

/// Outcome of the I/O-free part of a mutation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAccess {
    /// Allowed without further lookups.
    Allowed,
    /// Denied without further lookups.
    Denied,
    /// Allowed iff the caller is an editor of any of these deployments.
    RequiresEditorOnAny(Vec<DeploymentId>),
    /// Allowed iff the caller is an editor of every one of these deployments.
    RequiresEditorOnEach(Vec<DeploymentId>),
}

/// Decides whether a caller may create, modify or move resources of a kind.
#[derive(Debug, Clone, Copy)]
pub struct MutationRightsGuard<'a> {
    kind: ResourceKind,
    policy: &'a ResourcePolicy,
    levels: LevelSufficiencyGuard<'a>,
}

impl<'a> MutationRightsGuard<'a> {
    /// Create a guard for `kind`.
    pub fn new(table: &'a PolicyTable, kind: ResourceKind) -> Self {
        Self {
            kind,
            policy: table.policy(kind),
            levels: LevelSufficiencyGuard::new(table),
        }
    }

    /// Require the kind's manage permission.
    pub fn authorize_create(&self, user: &User) -> Result<()> {
        GlobalPermissionGuard.require_permission(user, self.policy.manage_permission().as_str())
    }

    /// Decide what can be decided about an update or delete without I/O.
    pub fn assess_update<R>(&self, resource: &R, user: &User) -> MutationAccess
    where
        R: ScopedResource + ?Sized,
    {
        if self.policy.grants_management(user) {
            return MutationAccess::Allowed;
        }
        if self.policy.tracks_creator && user.is(resource.created_by()) {
            return MutationAccess::Allowed;
        }
        let deployments = resource.deployment_ids();
        if deployments.is_empty() {
            return MutationAccess::Denied;
        }
        MutationAccess::RequiresEditorOnAny(deployments.into_iter().cloned().collect())
    }

    /// Decide what can be decided about moving a resource into
    /// `new_deployments` without I/O.
    pub fn assess_move(&self, user: &User, new_deployments: &[DeploymentId]) -> MutationAccess {
        if new_deployments.is_empty() || self.policy.grants_management(user) {
            return MutationAccess::Allowed;
        }
        MutationAccess::RequiresEditorOnEach(new_deployments.to_vec())
    }

    /// Authorize an update or delete of `resource`.
    ///
    /// `deployments` must hold the resource's deployments when the assessment
    /// asks for editor rights.
    pub fn authorize_update<R>(
        &self,
        resource: &R,
        user: &User,
        deployments: &[Deployment],
    ) -> Result<()>
    where
        R: ScopedResource + ?Sized,
    {
        let access = self.assess_update(resource, user);
        self.finish(access, user, deployments)
    }

    /// Authorize moving a resource into the deployments in `targets`.
    pub fn authorize_move(&self, user: &User, targets: &[Deployment]) -> Result<()> {
        let ids: Vec<DeploymentId> = targets.iter().map(|d| d.id.clone()).collect();
        let access = self.assess_move(user, &ids);
        self.finish(access, user, targets)
    }

    /// Settle an assessment with the fetched deployments.
    pub fn finish(
        &self,
        access: MutationAccess,
        user: &User,
        deployments: &[Deployment],
    ) -> Result<()> {
        match access {
            MutationAccess::Allowed => Ok(()),
            MutationAccess::Denied => {
                debug!(kind = %self.kind, user = ?user.id, "mutation denied");
                Err(ScopeError::forbidden(format!(
                    "You are not allowed to modify this {} resource",
                    self.kind
                )))
            }
            MutationAccess::RequiresEditorOnAny(ids) => {
                let relevant = select(&ids, deployments)?;
                self.levels.require_editor_on_any(relevant, user).map(|_| ())
            }
            MutationAccess::RequiresEditorOnEach(ids) => {
                for deployment in select(&ids, deployments)? {
                    self.levels.require_editor(deployment, user)?;
                }
                Ok(())
            }
        }
    }
}

/// Ids in `proposed` that are not already in `current`, in proposal order.
pub fn added_deployments<'d>(
    current: impl IntoIterator<Item = &'d DeploymentId>,
    proposed: impl IntoIterator<Item = &'d DeploymentId>,
) -> Vec<DeploymentId> {
    let current: Vec<&DeploymentId> = current.into_iter().collect();
    let mut added: Vec<DeploymentId> = Vec::new();
    for id in proposed {
        if !current.contains(&id) && !added.contains(id) {
            added.push(id.clone());
        }
    }
    added
}

fn select<'d>(ids: &[DeploymentId], deployments: &'d [Deployment]) -> Result<Vec<&'d Deployment>> {
    ids.iter()
        .map(|id| {
            deployments
                .iter()
                .find(|deployment| &deployment.id == id)
                .ok_or_else(|| {
                    ScopeError::internal(format!("deployment '{id}' was not fetched"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploygate_core::permission::{CRUD_SENSORS, CRUD_VOCAB_RESOURCES, GET_SENSORS};
    use deploygate_core::{AccessLevel, ResourceId, Sensor, VocabResource};

    fn lab() -> Deployment {
        Deployment::new("lab")
            .with_user("eng", AccessLevel::Engineer)
            .with_user("soc", AccessLevel::Social)
    }

    #[test]
    fn test_create_requires_manage_permission() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Units);
        assert!(matches!(
            guard.authorize_create(&User::anonymous()),
            Err(ScopeError::Unauthorized { .. })
        ));
        assert!(matches!(
            guard.authorize_create(&User::authenticated("u1")),
            Err(ScopeError::PermissionRequired { .. })
        ));
        guard
            .authorize_create(&User::authenticated("u1").with_permission(CRUD_VOCAB_RESOURCES))
            .unwrap();
    }

    #[test]
    fn test_sensor_create_needs_crud_not_get() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Sensors);
        let reader = User::authenticated("u1").with_permission(GET_SENSORS);
        assert!(guard.authorize_create(&reader).is_err());
        guard
            .authorize_create(&User::authenticated("u1").with_permission(CRUD_SENSORS))
            .unwrap();
    }

    #[test]
    fn test_creator_may_update_own_resource() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Units);
        let resource = VocabResource::new("unit").with_creator("u1");
        guard
            .authorize_update(&resource, &User::authenticated("u1"), &[])
            .unwrap();
        assert!(matches!(
            guard.authorize_update(&resource, &User::authenticated("u2"), &[]),
            Err(ScopeError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_update_in_deployment_requires_editor() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Units);
        let resource = VocabResource::new("unit").in_deployment("lab");
        let deployments = [lab()];

        guard
            .authorize_update(&resource, &User::authenticated("eng"), &deployments)
            .unwrap();
        assert!(matches!(
            guard.authorize_update(&resource, &User::authenticated("soc"), &deployments),
            Err(ScopeError::InsufficientDeploymentAccessLevel { .. })
        ));
        assert!(matches!(
            guard.authorize_update(&resource, &User::authenticated("out"), &deployments),
            Err(ScopeError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_move_checks_every_target() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Sensors);
        let other = Deployment::new("field").with_user("eng", AccessLevel::Basic);
        let eng = User::authenticated("eng");

        guard.authorize_move(&eng, &[lab()]).unwrap();
        assert!(guard.authorize_move(&eng, &[lab(), other.clone()]).is_err());

        let manager = User::authenticated("m").with_permission(CRUD_SENSORS);
        guard.authorize_move(&manager, &[other]).unwrap();
    }

    #[test]
    fn test_creator_does_not_skip_move_check() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Units);
        let creator = User::authenticated("soc");
        let resource = VocabResource::new("unit").with_creator("soc");

        assert_eq!(guard.assess_update(&resource, &creator), MutationAccess::Allowed);
        assert_eq!(
            guard.assess_move(&creator, &[DeploymentId::new("lab")]),
            MutationAccess::RequiresEditorOnEach(vec![DeploymentId::new("lab")])
        );
        assert!(guard.authorize_move(&creator, &[lab()]).is_err());
    }

    #[test]
    fn test_missing_fetched_deployment_is_internal() {
        let table = PolicyTable::default();
        let guard = MutationRightsGuard::new(&table, ResourceKind::Sensors);
        let sensor = Sensor {
            id: ResourceId::new("s1"),
            has_deployment: Some(DeploymentId::new("lab")),
        };
        assert!(matches!(
            guard.authorize_update(&sensor, &User::authenticated("eng"), &[]),
            Err(ScopeError::Internal { .. })
        ));
    }

    #[test]
    fn test_added_deployments() {
        let current = [DeploymentId::new("a"), DeploymentId::new("b")];
        let proposed = [
            DeploymentId::new("b"),
            DeploymentId::new("c"),
            DeploymentId::new("c"),
        ];
        assert_eq!(
            added_deployments(&current, &proposed),
            vec![DeploymentId::new("c")]
        );
    }
}
