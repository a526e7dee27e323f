//! Deployments, memberships and batched level records

use serde::{Deserialize, Serialize};

use crate::access_level::AccessLevel;
use crate::identifiers::{DeploymentId, UserId};

/// Membership of a user in a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentUser {
    /// Member id.
    pub id: UserId,
    /// Level granted to the member.
    pub level: AccessLevel,
}

/// A tenant-like container scoping resources and per-user access levels.
///
/// The engine treats a deployment as an immutable snapshot for the duration
/// of a decision; the repository owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment id.
    pub id: DeploymentId,

    /// Public deployments grant `basic` to every caller.
    #[serde(default)]
    pub public: bool,

    /// Members, unique by id.
    #[serde(default)]
    pub users: Vec<DeploymentUser>,
}

impl Deployment {
    /// Create a private deployment without members.
    pub fn new(id: impl Into<DeploymentId>) -> Self {
        Self {
            id: id.into(),
            public: false,
            users: Vec::new(),
        }
    }

    /// Set the public flag.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Add a member, replacing an existing membership for the same id.
    pub fn with_user(mut self, id: impl Into<UserId>, level: AccessLevel) -> Self {
        let id = id.into();
        match self.users.iter_mut().find(|member| member.id == id) {
            Some(member) => member.level = level,
            None => self.users.push(DeploymentUser { id, level }),
        }
        self
    }

    /// Level recorded for `user_id`, if the user is a member.
    ///
    /// Matches each member's own id against the requested id.
    pub fn member_level(&self, user_id: &UserId) -> Option<AccessLevel> {
        self.users
            .iter()
            .find(|member| &member.id == user_id)
            .map(|member| member.level)
    }

    /// Returns `true` if `user_id` is listed as a member.
    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.member_level(user_id).is_some()
    }
}

/// Result of a batched level lookup for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentLevelRecord {
    /// Deployment the record refers to.
    pub deployment_id: DeploymentId,

    /// Level of the caller, `None` when the caller has no access at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AccessLevel>,
}

impl DeploymentLevelRecord {
    /// Record granting `level`.
    pub fn granted(deployment_id: impl Into<DeploymentId>, level: AccessLevel) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            level: Some(level),
        }
    }

    /// Record for a deployment the caller cannot access.
    pub fn no_access(deployment_id: impl Into<DeploymentId>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            level: None,
        }
    }

    /// Returns `true` if the caller has any level.
    pub fn has_access(&self) -> bool {
        self.level.is_some()
    }
}

/// Filter accepted by [`crate::DeploymentRepository::get_deployments`].
///
/// `user` selects deployments the user is a member of; `public` selects by
/// the public flag. Both set means both must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentFilter {
    /// Member to select by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    /// Public flag to select by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl DeploymentFilter {
    /// Deployments `user` is a member of.
    pub fn member(user: UserId) -> Self {
        Self {
            user: Some(user),
            public: None,
        }
    }

    /// Private deployments `user` is a member of.
    pub fn private_member(user: UserId) -> Self {
        Self {
            user: Some(user),
            public: Some(false),
        }
    }

    /// Every public deployment.
    pub fn public() -> Self {
        Self {
            user: None,
            public: Some(true),
        }
    }

    /// Returns `true` if `deployment` satisfies the filter.
    pub fn matches(&self, deployment: &Deployment) -> bool {
        let user_ok = self
            .user
            .as_ref()
            .map_or(true, |user| deployment.has_member(user));
        let public_ok = self.public.map_or(true, |public| deployment.public == public);
        user_ok && public_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_level_matches_requested_user_only() {
        let deployment = Deployment::new("d1")
            .with_user("u1", AccessLevel::Engineer)
            .with_user("u3", AccessLevel::Social);

        assert_eq!(
            deployment.member_level(&UserId::new("u1")),
            Some(AccessLevel::Engineer)
        );
        assert_eq!(
            deployment.member_level(&UserId::new("u3")),
            Some(AccessLevel::Social)
        );
        assert_eq!(deployment.member_level(&UserId::new("u2")), None);
    }

    #[test]
    fn test_with_user_keeps_ids_unique() {
        let deployment = Deployment::new("d1")
            .with_user("u1", AccessLevel::Basic)
            .with_user("u1", AccessLevel::Admin);
        assert_eq!(deployment.users.len(), 1);
        assert_eq!(
            deployment.member_level(&UserId::new("u1")),
            Some(AccessLevel::Admin)
        );
    }

    #[test]
    fn test_level_record_wire_format() {
        let record = DeploymentLevelRecord::no_access("d1");
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({ "deploymentId": "d1" })
        );

        let record: DeploymentLevelRecord =
            serde_json::from_str(r#"{"deploymentId":"d2","level":"engineer"}"#).unwrap();
        assert_eq!(record, DeploymentLevelRecord::granted("d2", AccessLevel::Engineer));
    }

    #[test]
    fn test_filter_matches() {
        let public = Deployment::new("p").with_public(true);
        let mine = Deployment::new("m").with_user("u1", AccessLevel::Basic);

        assert!(DeploymentFilter::public().matches(&public));
        assert!(!DeploymentFilter::public().matches(&mine));
        assert!(DeploymentFilter::member(UserId::new("u1")).matches(&mine));
        assert!(!DeploymentFilter::member(UserId::new("u1")).matches(&public));
        assert!(DeploymentFilter::default().matches(&public));

        let joined_public = public.clone().with_user("u1", AccessLevel::Basic);
        assert!(DeploymentFilter::member(UserId::new("u1")).matches(&joined_public));
        assert!(!DeploymentFilter::private_member(UserId::new("u1")).matches(&joined_public));
        assert!(DeploymentFilter::private_member(UserId::new("u1")).matches(&mine));
    }
}
