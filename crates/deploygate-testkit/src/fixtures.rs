//! Common callers, deployments and snapshots

use deploygate_core::permission::{ADMIN_ALL_DEPLOYMENTS, CRUD_VOCAB_RESOURCES};
use deploygate_core::{AccessLevel, Deployment, DeploymentId, SnapshotRepository, User};

/// Caller without identity or permissions.
pub fn anonymous() -> User {
    User::anonymous()
}

/// Authenticated caller without permissions.
pub fn member(id: &str) -> User {
    User::authenticated(id)
}

/// Caller holding the blanket deployment permission.
pub fn admin_all(id: &str) -> User {
    User::authenticated(id).with_permission(ADMIN_ALL_DEPLOYMENTS)
}

/// Caller holding full access to vocabulary resources.
pub fn vocab_admin(id: &str) -> User {
    User::authenticated(id).with_permission(CRUD_VOCAB_RESOURCES)
}

/// Private deployment `D1` where `u1` is an engineer.
pub fn d1() -> Deployment {
    Deployment::new("D1").with_user("u1", AccessLevel::Engineer)
}

/// Public deployment `D2` without users.
pub fn d2() -> Deployment {
    Deployment::new("D2").with_public(true)
}

/// A small campaign used across integration tests:
///
/// ```text
/// river      private  u1 admin, u2 social
/// estuary    private  u2 engineer
/// coast      public   u1 basic
/// archive    private  nobody
/// ```
pub fn field_campaign() -> Vec<Deployment> {
    vec![
        Deployment::new("river")
            .with_user("u1", AccessLevel::Admin)
            .with_user("u2", AccessLevel::Social),
        Deployment::new("estuary").with_user("u2", AccessLevel::Engineer),
        Deployment::new("coast")
            .with_public(true)
            .with_user("u1", AccessLevel::Basic),
        Deployment::new("archive"),
    ]
}

/// Snapshot repository over [`field_campaign`].
pub fn field_campaign_repository() -> SnapshotRepository {
    SnapshotRepository::new(field_campaign())
}

/// Deployment ids from names.
pub fn deployment_ids(names: &[&str]) -> Vec<DeploymentId> {
    names.iter().map(|name| DeploymentId::new(*name)).collect()
}
