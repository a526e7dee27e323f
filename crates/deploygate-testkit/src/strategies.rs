//! Property test strategies for deploygate types
//!
//! Ids are drawn from small pools so generated callers and deployments
//! overlap often enough to exercise membership.

use proptest::prelude::*;

pub use proptest;

use deploygate_core::permission::{ADMIN_ALL_DEPLOYMENTS, CRUD_VOCAB_RESOURCES};
use deploygate_core::{
    AccessLevel, Deployment, DeploymentId, DeploymentUser, Permission, User, UserId,
    VocabResource,
};

/// Strategy for access levels.
pub fn arb_access_level() -> impl Strategy<Value = AccessLevel> {
    prop::sample::select(AccessLevel::ALL.to_vec())
}

/// Strategy for user ids from the pool `u0..u5`.
pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    (0u8..6).prop_map(|n| UserId::new(format!("u{n}")))
}

/// Strategy for deployment ids from the pool `d0..d5`.
pub fn arb_deployment_id() -> impl Strategy<Value = DeploymentId> {
    (0u8..6).prop_map(|n| DeploymentId::new(format!("d{n}")))
}

/// Strategy for deployments with unique members.
pub fn arb_deployment() -> impl Strategy<Value = Deployment> {
    (
        arb_deployment_id(),
        any::<bool>(),
        prop::collection::btree_map(arb_user_id(), arb_access_level(), 0..4),
    )
        .prop_map(|(id, public, members)| Deployment {
            id,
            public,
            users: members
                .into_iter()
                .map(|(id, level)| DeploymentUser { id, level })
                .collect(),
        })
}

/// Strategy for a deployment that is private (`public == false`).
pub fn arb_private_deployment() -> impl Strategy<Value = Deployment> {
    arb_deployment().prop_map(|deployment| deployment.with_public(false))
}

/// Strategy for callers without permissions, anonymous a quarter of the time.
pub fn arb_plain_user() -> impl Strategy<Value = User> {
    prop_oneof![
        1 => Just(User::anonymous()),
        3 => arb_user_id().prop_map(User::authenticated),
    ]
}

/// Strategy for global permission sets mixing engine and unrelated permissions.
pub fn arb_permissions() -> impl Strategy<Value = Vec<Permission>> {
    prop::collection::vec(
        prop::sample::select(vec![
            ADMIN_ALL_DEPLOYMENTS,
            CRUD_VOCAB_RESOURCES,
            "get:sensors",
            "crud:platforms",
            "read:reports",
        ])
        .prop_map(Permission::new),
        0..3,
    )
}

/// Strategy for any caller.
pub fn arb_user() -> impl Strategy<Value = User> {
    (arb_plain_user(), arb_permissions()).prop_map(|(mut user, permissions)| {
        user.permissions.extend(permissions);
        user
    })
}

/// Strategy for vocabulary resources.
pub fn arb_vocab_resource() -> impl Strategy<Value = VocabResource> {
    (
        any::<bool>(),
        proptest::option::of(arb_deployment_id()),
        proptest::option::of(arb_user_id()),
    )
        .prop_map(|(listed, deployment, creator)| VocabResource {
            id: "resource".into(),
            listed,
            belongs_to_deployment: deployment,
            created_by: creator,
        })
}
