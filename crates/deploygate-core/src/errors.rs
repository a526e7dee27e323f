//! Unified error type for deploygate
//!
//! The first five variants are operational: they describe an expected outcome
//! the gateway reports to the client unchanged. The remaining variants are
//! configuration, collaborator or programmer errors.
//!
//! Messages name the caller's own level or permissions and the acceptable set,
//! but never whether a hidden resource exists.

use serde::{Deserialize, Serialize};

use crate::access_level::{AccessLevel, SufficientLevels};
use crate::identifiers::DeploymentId;
use crate::permission::Permission;

/// Unified error type for all deploygate operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ScopeError {
    /// The operation requires authentication and none was presented
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// What required authentication
        message: String,
    },

    /// The caller has no access at all to a private resource or deployment
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Generic description that does not reveal existence
        message: String,
    },

    /// The caller has a level on the deployment, but not an acceptable one
    #[error(
        "Insufficient deployment access level: your level for deployment '{deployment}' is \
         '{level}', this operation requires one of [{acceptable}]"
    )]
    InsufficientDeploymentAccessLevel {
        /// Deployment the level was resolved for
        deployment: DeploymentId,
        /// Level the caller holds
        level: AccessLevel,
        /// Levels the operation accepts
        acceptable: SufficientLevels,
    },

    /// The caller lacks a required global permission
    #[error("Permission required: '{permission}' is needed. {held}")]
    PermissionRequired {
        /// Permission the operation requires
        permission: Permission,
        /// Description of the permissions the caller holds
        held: String,
    },

    /// A referenced record does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Invalid configuration or input
    #[error("Invalid: {message}")]
    Invalid {
        /// What is invalid
        message: String,
    },

    /// A collaborator call failed
    #[error("Repository error: {message}")]
    Repository {
        /// Failure reported by the collaborator
        message: String,
    },

    /// Internal invariant violated
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

impl ScopeError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an insufficient level error
    pub fn insufficient_level(
        deployment: DeploymentId,
        level: AccessLevel,
        acceptable: SufficientLevels,
    ) -> Self {
        Self::InsufficientDeploymentAccessLevel {
            deployment,
            level,
            acceptable,
        }
    }

    /// Create a permission required error
    pub fn permission_required(permission: impl Into<Permission>, held: impl Into<String>) -> Self {
        Self::PermissionRequired {
            permission: permission.into(),
            held: held.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a repository error
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` for expected, client-facing outcomes.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::Forbidden { .. }
                | Self::InsufficientDeploymentAccessLevel { .. }
                | Self::PermissionRequired { .. }
                | Self::NotFound { .. }
        )
    }

    /// Stable machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::InsufficientDeploymentAccessLevel { .. } => {
                "insufficient_deployment_access_level"
            }
            Self::PermissionRequired { .. } => "permission_required",
            Self::NotFound { .. } => "not_found",
            Self::Invalid { .. } => "invalid",
            Self::Repository { .. } => "repository",
            Self::Internal { .. } => "internal",
        }
    }

    /// HTTP status the gateway reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::Forbidden { .. }
            | Self::InsufficientDeploymentAccessLevel { .. }
            | Self::PermissionRequired { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Repository { .. } => 502,
            Self::Invalid { .. } | Self::Internal { .. } => 500,
        }
    }
}

/// Standard Result type for deploygate operations
pub type Result<T> = std::result::Result<T, ScopeError>;

impl From<std::io::Error> for ScopeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for ScopeError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("Invalid TOML: {err}"))
    }
}
