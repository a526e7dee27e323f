//! Per-deployment access level resolution
//!
//! Resolution order for a caller on one deployment:
//!
//! 1. the blanket deployment permission resolves to `admin`;
//! 2. otherwise the `users` entry whose id equals the caller's id supplies the level;
//! 3. otherwise a public deployment grants `basic`;
//! 4. otherwise the caller is not a user of the private deployment (`Forbidden`).
//!
//! Only after a level is resolved is it checked against the operation's
//! acceptable set, so "no access" and "not enough access" stay distinct.

use std::collections::HashMap;

use deploygate_core::{
    AccessLevel, Deployment, DeploymentId, DeploymentLevelRecord, Result, ScopeError,
    SufficientLevels, User,
};
use tracing::debug;

use crate::policy::PolicyTable;

/// Resolves a caller's level on already-fetched deployments.
#[derive(Debug, Clone, Copy)]
pub struct AccessLevelResolver<'a> {
    table: &'a PolicyTable,
}

impl<'a> AccessLevelResolver<'a> {
    /// Create a resolver over a policy table.
    pub fn new(table: &'a PolicyTable) -> Self {
        Self { table }
    }

    /// Resolve the caller's level on `deployment`, optionally requiring it to
    /// be one of `sufficient`.
    pub fn resolve_level(
        &self,
        deployment: &Deployment,
        user: &User,
        sufficient: Option<&SufficientLevels>,
    ) -> Result<AccessLevel> {
        let level = self.effective_level(deployment, user).ok_or_else(|| {
            debug!(deployment = %deployment.id, user = ?user.id, "caller is not a user of private deployment");
            ScopeError::forbidden(format!(
                "You are not a user of the private deployment '{}'",
                deployment.id
            ))
        })?;

        if let Some(acceptable) = sufficient {
            if !acceptable.contains(level) {
                debug!(
                    deployment = %deployment.id,
                    level = %level,
                    acceptable = %acceptable,
                    "resolved level is not sufficient"
                );
                return Err(ScopeError::insufficient_level(
                    deployment.id.clone(),
                    level,
                    acceptable.clone(),
                ));
            }
        }
        Ok(level)
    }

    /// Same as [`resolve_level`](Self::resolve_level) with the acceptable set
    /// given as level names; an unknown name is an `Internal` error.
    pub fn resolve_level_named<S: AsRef<str>>(
        &self,
        deployment: &Deployment,
        user: &User,
        sufficient: &[S],
    ) -> Result<AccessLevel> {
        let acceptable = SufficientLevels::parse(sufficient)?;
        self.resolve_level(deployment, user, Some(&acceptable))
    }

    /// Level before any sufficiency check, `None` when the caller has no access.
    pub fn effective_level(&self, deployment: &Deployment, user: &User) -> Option<AccessLevel> {
        if self.table.is_admin_all(user) {
            return Some(AccessLevel::Admin);
        }
        if let Some(level) = user
            .id
            .as_ref()
            .and_then(|caller| deployment.member_level(caller))
        {
            return Some(level);
        }
        deployment.public.then_some(AccessLevel::Basic)
    }
}

/// Indexed result of one batched level lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelLookup {
    records: Vec<DeploymentLevelRecord>,
    index: HashMap<DeploymentId, usize>,
}

impl LevelLookup {
    /// Check `records` against the collaborator contract for `requested`:
    /// exactly one record per id, in input order.
    pub fn from_records(
        requested: &[DeploymentId],
        records: Vec<DeploymentLevelRecord>,
    ) -> Result<Self> {
        if records.len() != requested.len() {
            return Err(ScopeError::internal(format!(
                "level lookup returned {} records for {} deployments",
                records.len(),
                requested.len()
            )));
        }
        if let Some((expected, record)) = requested
            .iter()
            .zip(records.iter())
            .find(|(expected, record)| **expected != record.deployment_id)
        {
            return Err(ScopeError::internal(format!(
                "level lookup returned deployment '{}' where '{}' was requested",
                record.deployment_id, expected
            )));
        }
        let index = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.deployment_id.clone(), position))
            .collect();
        Ok(Self { records, index })
    }

    /// Level recorded for `deployment`, `None` for no access or unknown ids.
    pub fn level_for(&self, deployment: &DeploymentId) -> Option<AccessLevel> {
        self.index
            .get(deployment)
            .and_then(|position| self.records.get(*position))
            .and_then(|record| record.level)
    }

    /// Returns `true` if any record carries a level.
    pub fn any_access(&self) -> bool {
        self.records.iter().any(DeploymentLevelRecord::has_access)
    }

    /// Deployments with a defined level, in lookup order.
    pub fn accessible(&self) -> impl Iterator<Item = &DeploymentId> {
        self.records
            .iter()
            .filter(|record| record.has_access())
            .map(|record| &record.deployment_id)
    }

    /// Records in lookup order.
    pub fn records(&self) -> &[DeploymentLevelRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploygate_core::permission::ADMIN_ALL_DEPLOYMENTS;
    use deploygate_core::UserId;

    fn d1() -> Deployment {
        Deployment::new("D1").with_user("u1", AccessLevel::Engineer)
    }

    #[test]
    fn test_member_resolves_to_own_level() {
        let table = PolicyTable::default();
        let resolver = AccessLevelResolver::new(&table);
        let level = resolver
            .resolve_level(
                &d1(),
                &User::authenticated("u1"),
                Some(&SufficientLevels::editors()),
            )
            .unwrap();
        assert_eq!(level, AccessLevel::Engineer);
    }

    #[test]
    fn test_non_member_of_private_deployment_is_forbidden() {
        let table = PolicyTable::default();
        let err = AccessLevelResolver::new(&table)
            .resolve_level(
                &d1(),
                &User::authenticated("u2"),
                Some(&SufficientLevels::editors()),
            )
            .unwrap_err();
        assert!(matches!(err, ScopeError::Forbidden { .. }));
    }

    // A membership lookup that compared each element's id with itself would
    // hand the first member's level to any authenticated caller.
    #[test]
    fn test_membership_matches_element_id_against_caller() {
        let table = PolicyTable::default();
        let resolver = AccessLevelResolver::new(&table);
        let deployment = Deployment::new("D1")
            .with_user("u1", AccessLevel::Admin)
            .with_user("u3", AccessLevel::Social);

        assert_eq!(
            resolver.effective_level(&deployment, &User::authenticated("u2")),
            None
        );
        assert_eq!(
            resolver.effective_level(&deployment, &User::authenticated("u3")),
            Some(AccessLevel::Social)
        );
    }

    #[test]
    fn test_anonymous_caller_on_public_deployment_is_basic() {
        let table = PolicyTable::default();
        let d2 = Deployment::new("D2").with_public(true);
        let level = AccessLevelResolver::new(&table)
            .resolve_level_named(&d2, &User::anonymous(), &["basic"])
            .unwrap();
        assert_eq!(level, AccessLevel::Basic);
    }

    #[test]
    fn test_admin_all_ignores_users() {
        let table = PolicyTable::default();
        let user = User::authenticated("u9").with_permission(ADMIN_ALL_DEPLOYMENTS);
        let deployment = Deployment::new("D1").with_user("u9", AccessLevel::Basic);
        assert_eq!(
            AccessLevelResolver::new(&table)
                .resolve_level(&deployment, &user, None)
                .unwrap(),
            AccessLevel::Admin
        );
    }

    #[test]
    fn test_insufficient_level_names_level_and_set() {
        let table = PolicyTable::default();
        let deployment = Deployment::new("D3")
            .with_public(true)
            .with_user("u1", AccessLevel::Social);
        let err = AccessLevelResolver::new(&table)
            .resolve_level(
                &deployment,
                &User::authenticated("u1"),
                Some(&SufficientLevels::editors()),
            )
            .unwrap_err();
        match err {
            ScopeError::InsufficientDeploymentAccessLevel {
                deployment,
                level,
                acceptable,
            } => {
                assert_eq!(deployment, DeploymentId::new("D3"));
                assert_eq!(level, AccessLevel::Social);
                assert_eq!(acceptable, SufficientLevels::editors());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_level_name_is_internal() {
        let table = PolicyTable::default();
        let err = AccessLevelResolver::new(&table)
            .resolve_level_named(&d1(), &User::authenticated("u1"), &["admin", "root"])
            .unwrap_err();
        assert!(matches!(err, ScopeError::Internal { .. }));
    }

    #[test]
    fn test_lookup_enforces_order_and_count() {
        let requested = vec![DeploymentId::new("a"), DeploymentId::new("b")];

        let lookup = LevelLookup::from_records(
            &requested,
            vec![
                DeploymentLevelRecord::no_access("a"),
                DeploymentLevelRecord::granted("b", AccessLevel::Basic),
            ],
        )
        .unwrap();
        assert!(lookup.any_access());
        assert_eq!(lookup.level_for(&DeploymentId::new("a")), None);
        assert_eq!(
            lookup.level_for(&DeploymentId::new("b")),
            Some(AccessLevel::Basic)
        );
        assert_eq!(
            lookup.accessible().collect::<Vec<_>>(),
            vec![&DeploymentId::new("b")]
        );

        let swapped = LevelLookup::from_records(
            &requested,
            vec![
                DeploymentLevelRecord::no_access("b"),
                DeploymentLevelRecord::no_access("a"),
            ],
        );
        assert!(matches!(swapped, Err(ScopeError::Internal { .. })));

        let short =
            LevelLookup::from_records(&requested, vec![DeploymentLevelRecord::no_access("a")]);
        assert!(matches!(short, Err(ScopeError::Internal { .. })));
    }

    #[test]
    fn test_anonymous_has_no_membership() {
        let table = PolicyTable::default();
        let deployment = Deployment::new("D1").with_user(UserId::new("u1"), AccessLevel::Admin);
        assert_eq!(
            AccessLevelResolver::new(&table).effective_level(&deployment, &User::anonymous()),
            None
        );
    }
}
