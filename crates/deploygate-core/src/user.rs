//! Caller identity as supplied by the authentication middleware

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;
use crate::permission::Permission;

/// The caller of a request.
///
/// `id` is `None` for anonymous callers. Permissions may still be present on
/// an anonymous caller (service tokens), they are checked independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Authenticated user id, absent for anonymous callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    /// Global permissions held by the caller.
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl User {
    /// An anonymous caller with no permissions.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated caller with no permissions.
    pub fn authenticated(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            permissions: BTreeSet::new(),
        }
    }

    /// Add a permission.
    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Returns `true` if the caller presented no identity.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Returns `true` if the caller holds `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if `candidate` is the caller's own id.
    ///
    /// Always `false` for anonymous callers, so an absent creator never
    /// matches an absent caller.
    pub fn is(&self, candidate: Option<&UserId>) -> bool {
        match (&self.id, candidate) {
            (Some(own), Some(other)) => own == other,
            _ => false,
        }
    }

    /// Human readable list of the caller's permissions for error messages.
    pub fn describe_permissions(&self) -> String {
        if self.permissions.is_empty() {
            return "You have no permissions".to_string();
        }
        let names: Vec<&str> = self.permissions.iter().map(Permission::as_str).collect();
        format!("Your permissions are: {}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_never_matches_missing_creator() {
        let anon = User::anonymous();
        assert!(!anon.is(None));
        assert!(!anon.is(Some(&UserId::new("u1"))));

        let user = User::authenticated("u1");
        assert!(user.is(Some(&UserId::new("u1"))));
        assert!(!user.is(None));
    }

    #[test]
    fn test_describe_permissions() {
        assert_eq!(
            User::authenticated("u1").describe_permissions(),
            "You have no permissions"
        );
        let user = User::authenticated("u1")
            .with_permission("get:sensors")
            .with_permission(crate::permission::ADMIN_ALL_DEPLOYMENTS);
        assert_eq!(
            user.describe_permissions(),
            "Your permissions are: admin-all:deployments, get:sensors"
        );
    }

    #[test]
    fn test_deserialize_from_token_claims() {
        let user: User = serde_json::from_str(r#"{"permissions":["crud:vocab-resources"]}"#)
            .unwrap();
        assert!(user.is_anonymous());
        assert!(user.has_permission("crud:vocab-resources"));
    }
}
