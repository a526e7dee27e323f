//! Global permission checks, independent of any deployment

use deploygate_core::{Result, ScopeError, User};
use tracing::debug;

/// Checks membership of the caller's global permission set.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalPermissionGuard;

impl GlobalPermissionGuard {
    /// Require an authenticated caller holding `permission`.
    pub fn require_permission(&self, user: &User, permission: &str) -> Result<()> {
        if user.is_anonymous() {
            debug!(permission, "anonymous caller rejected");
            return Err(ScopeError::unauthorized(format!(
                "Authentication is required, '{permission}' cannot be granted to an anonymous caller"
            )));
        }
        if !user.has_permission(permission) {
            debug!(user = ?user.id, permission, "global permission missing");
            return Err(ScopeError::permission_required(
                permission,
                user.describe_permissions(),
            ));
        }
        Ok(())
    }

    /// Like [`require_permission`](Self::require_permission) but as a predicate.
    pub fn passes(&self, user: &User, permission: &str) -> bool {
        !user.is_anonymous() && user.has_permission(permission)
    }
}
