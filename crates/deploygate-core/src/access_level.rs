//! Deployment access levels and sufficiency sets
//!
//! Levels form a closed set with no built-in ordering: `admin` is not "greater
//! than" `engineer` as far as the engine is concerned. An operation states the
//! levels it accepts through a [`SufficientLevels`] set and the resolved level
//! must be a member of it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ScopeError;

/// Access level a user holds on a single deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Full control over the deployment and its resources.
    Admin,
    /// May edit resources scoped to the deployment.
    Engineer,
    /// Read access intended for community partners.
    Social,
    /// Read access; every caller gets this on a public deployment.
    Basic,
}

impl AccessLevel {
    /// All known levels.
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Admin,
        AccessLevel::Engineer,
        AccessLevel::Social,
        AccessLevel::Basic,
    ];

    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Engineer => "engineer",
            AccessLevel::Social => "social",
            AccessLevel::Basic => "basic",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ScopeError::internal(format!("unknown access level '{s}'")))
    }
}

/// Set of levels an operation accepts.
///
/// Insertion order is kept so error messages list levels the way the
/// operation declared them. Duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AccessLevel>", into = "Vec<AccessLevel>")]
pub struct SufficientLevels(Vec<AccessLevel>);

impl SufficientLevels {
    /// Build a set from typed levels.
    pub fn new(levels: impl IntoIterator<Item = AccessLevel>) -> Self {
        let mut unique = Vec::with_capacity(AccessLevel::ALL.len());
        for level in levels {
            if !unique.contains(&level) {
                unique.push(level);
            }
        }
        Self(unique)
    }

    /// Build a set from level names, failing with an internal error on the
    /// first name that is not a known level.
    pub fn parse<I, S>(names: I) -> Result<Self, ScopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let levels = names
            .into_iter()
            .map(|name| name.as_ref().parse::<AccessLevel>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(levels))
    }

    /// Levels allowed to edit deployment-scoped resources.
    pub fn editors() -> Self {
        Self::new([AccessLevel::Admin, AccessLevel::Engineer])
    }

    /// Returns `true` if `level` is acceptable.
    pub fn contains(&self, level: AccessLevel) -> bool {
        self.0.contains(&level)
    }

    /// Levels in declaration order.
    pub fn as_slice(&self) -> &[AccessLevel] {
        &self.0
    }

    /// Returns `true` if no level is acceptable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<AccessLevel>> for SufficientLevels {
    fn from(value: Vec<AccessLevel>) -> Self {
        Self::new(value)
    }
}

impl From<SufficientLevels> for Vec<AccessLevel> {
    fn from(value: SufficientLevels) -> Self {
        value.0
    }
}

impl fmt::Display for SufficientLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(AccessLevel::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}
