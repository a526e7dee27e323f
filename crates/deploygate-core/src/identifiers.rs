//! Typed identifiers
//!
//! Every identifier is an opaque string assigned by the resource repository.
//! The newtypes only exist so a user id cannot be passed where a deployment id
//! is expected.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated user.
    UserId
);

string_id!(
    /// Identifier of a deployment.
    DeploymentId
);

string_id!(
    /// Identifier of a vocabulary resource, sensor, timeseries or check.
    ResourceId
);

string_id!(
    /// Identifier of a platform.
    PlatformId
);
