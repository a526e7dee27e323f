//! Per-resource-type policy table
//!
//! Every resource type shares the same guards; what differs is captured here
//! as data. A [`ResourcePolicy`] says which global permission grants full
//! visibility, which grants management rights, whether the type carries a
//! `listed` flag, whether its creator is tracked, and how it is associated
//! with deployments.
//!
//! ```text
//! kind                  listed  creator  association                      public  unassociated
//! vocabulary types      yes     yes      single belongsToDeployment       no      hidden
//! checks                no      no       single appliesTo.hasDeployment   yes     visible
//! platforms             no      no       multi  inDeployments             yes     hidden
//! sensors, timeseries   no      no       single hasDeployment             yes     hidden
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use deploygate_core::permission::{
    ADMIN_ALL_DEPLOYMENTS, CRUD_CHECKS, CRUD_PLATFORMS, CRUD_SENSORS, CRUD_TIMESERIES,
    CRUD_VOCAB_RESOURCES, GET_SENSORS, GET_TIMESERIES,
};
use deploygate_core::{Permission, Result, ScopeError, SufficientLevels, User};
use serde::{Deserialize, Serialize};

/// Resource types guarded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Units of measurement.
    Units,
    /// Scientific disciplines.
    Disciplines,
    /// Observable properties.
    ObservableProperties,
    /// Measurement procedures.
    Procedures,
    /// Aggregation methods.
    Aggregations,
    /// Features of interest.
    FeaturesOfInterest,
    /// Quality-control checks.
    Checks,
    /// Platforms.
    Platforms,
    /// Sensors.
    Sensors,
    /// Timeseries.
    Timeseries,
}

impl ResourceKind {
    /// All guarded kinds.
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Units,
        ResourceKind::Disciplines,
        ResourceKind::ObservableProperties,
        ResourceKind::Procedures,
        ResourceKind::Aggregations,
        ResourceKind::FeaturesOfInterest,
        ResourceKind::Checks,
        ResourceKind::Platforms,
        ResourceKind::Sensors,
        ResourceKind::Timeseries,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Collection name as used in routes and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Units => "units",
            ResourceKind::Disciplines => "disciplines",
            ResourceKind::ObservableProperties => "observable-properties",
            ResourceKind::Procedures => "procedures",
            ResourceKind::Aggregations => "aggregations",
            ResourceKind::FeaturesOfInterest => "features-of-interest",
            ResourceKind::Checks => "checks",
            ResourceKind::Platforms => "platforms",
            ResourceKind::Sensors => "sensors",
            ResourceKind::Timeseries => "timeseries",
        }
    }

    /// Built-in policy for the kind.
    pub fn default_policy(&self) -> ResourcePolicy {
        match self {
            ResourceKind::Units
            | ResourceKind::Disciplines
            | ResourceKind::ObservableProperties
            | ResourceKind::Procedures
            | ResourceKind::Aggregations
            | ResourceKind::FeaturesOfInterest => ResourcePolicy {
                full_access_permission: Permission::new(CRUD_VOCAB_RESOURCES),
                manage_permission: None,
                listed_flag: true,
                tracks_creator: true,
                association: Association::single("belongsToDeployment"),
                public_deployments_visible: false,
                unassociated_visible: false,
            },
            ResourceKind::Checks => ResourcePolicy {
                full_access_permission: Permission::new(CRUD_CHECKS),
                manage_permission: None,
                listed_flag: false,
                tracks_creator: false,
                association: Association::single("appliesTo.hasDeployment"),
                public_deployments_visible: true,
                unassociated_visible: true,
            },
            ResourceKind::Platforms => ResourcePolicy {
                full_access_permission: Permission::new(CRUD_PLATFORMS),
                manage_permission: None,
                listed_flag: false,
                tracks_creator: false,
                association: Association::multi("inDeployments"),
                public_deployments_visible: true,
                unassociated_visible: false,
            },
            ResourceKind::Sensors => ResourcePolicy {
                full_access_permission: Permission::new(GET_SENSORS),
                manage_permission: Some(Permission::new(CRUD_SENSORS)),
                listed_flag: false,
                tracks_creator: false,
                association: Association::single("hasDeployment"),
                public_deployments_visible: true,
                unassociated_visible: false,
            },
            ResourceKind::Timeseries => ResourcePolicy {
                full_access_permission: Permission::new(GET_TIMESERIES),
                manage_permission: Some(Permission::new(CRUD_TIMESERIES)),
                listed_flag: false,
                tracks_creator: false,
                association: Association::single("hasDeployment"),
                public_deployments_visible: true,
                unassociated_visible: false,
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ScopeError::invalid(format!("unknown resource kind '{s}'")))
    }
}

/// How a resource type is associated with deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Association {
    /// Never deployment scoped.
    #[default]
    Unscoped,
    /// At most one deployment, stored in `field`.
    Single {
        /// Dotted field path holding the deployment id.
        field: String,
    },
    /// Any number of deployments, stored as an array in `field`.
    Multi {
        /// Dotted field path holding the deployment ids.
        field: String,
    },
}

impl Association {
    /// Single-valued association stored in `field`.
    pub fn single(field: impl Into<String>) -> Self {
        Self::Single {
            field: field.into(),
        }
    }

    /// Multi-valued association stored in `field`.
    pub fn multi(field: impl Into<String>) -> Self {
        Self::Multi {
            field: field.into(),
        }
    }

    /// Field holding the association, `None` when unscoped.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Unscoped => None,
            Self::Single { field } | Self::Multi { field } => Some(field),
        }
    }
}

/// Access policy of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePolicy {
    /// Permission granting visibility of every resource of the type.
    pub full_access_permission: Permission,

    /// Permission granting create/update/delete on every resource of the type.
    /// Falls back to `full_access_permission` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_permission: Option<Permission>,

    /// Resources carry a `listed` flag; listed ones are visible to everyone.
    #[serde(default)]
    pub listed_flag: bool,

    /// Resources record their creator, who may see and modify them.
    #[serde(default)]
    pub tracks_creator: bool,

    /// Deployment association.
    #[serde(default)]
    pub association: Association,

    /// Resources in public deployments are visible to every caller.
    #[serde(default)]
    pub public_deployments_visible: bool,

    /// Resources without any deployment are visible to every caller.
    #[serde(default)]
    pub unassociated_visible: bool,
}

impl ResourcePolicy {
    /// Permission required to create, or to modify any resource.
    pub fn manage_permission(&self) -> &Permission {
        self.manage_permission
            .as_ref()
            .unwrap_or(&self.full_access_permission)
    }

    /// Returns `true` if `user` holds the full-access permission, identified
    /// or not. Listings classify callers by this alone.
    pub fn holds_full_access(&self, user: &User) -> bool {
        user.has_permission(self.full_access_permission.as_str())
    }

    /// Returns `true` if `user` sees every single resource of this type.
    ///
    /// Type-wide permissions only count for identified callers here.
    pub fn grants_full_access(&self, user: &User) -> bool {
        !user.is_anonymous() && user.has_permission(self.full_access_permission.as_str())
    }

    /// Returns `true` if `user` may modify every resource of this type.
    pub fn grants_management(&self, user: &User) -> bool {
        !user.is_anonymous() && user.has_permission(self.manage_permission().as_str())
    }

    /// Reject policies whose listing predicate could never let anything
    /// through for an ordinary caller.
    pub fn validate(&self, kind: &str) -> Result<()> {
        if let Some(field) = self.association.field() {
            if field.trim().is_empty() {
                return Err(ScopeError::invalid(format!(
                    "resources.{kind}: association field cannot be empty"
                )));
            }
        }
        let restricts_by_something = self.listed_flag
            || self.tracks_creator
            || self.association.field().is_some()
            || self.unassociated_visible;
        if !restricts_by_something {
            return Err(ScopeError::invalid(format!(
                "resources.{kind}: policy has no listed flag, creator, association or \
                 unassociated visibility, listings would always be empty"
            )));
        }
        if self.full_access_permission.as_str().is_empty() {
            return Err(ScopeError::invalid(format!(
                "resources.{kind}: full_access_permission cannot be empty"
            )));
        }
        Ok(())
    }
}

/// Complete, validated rule set the guards evaluate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    admin_all_permission: Permission,
    editor_levels: SufficientLevels,
    // Indexed by `ResourceKind::index`, one entry per kind.
    resources: [ResourcePolicy; ResourceKind::ALL.len()],
}

impl PolicyTable {
    /// Build a table, filling kinds without an override with their defaults.
    pub fn new(
        admin_all_permission: Permission,
        editor_levels: SufficientLevels,
        mut overrides: BTreeMap<ResourceKind, ResourcePolicy>,
    ) -> Result<Self> {
        if editor_levels.is_empty() {
            return Err(ScopeError::invalid("editor_levels cannot be empty"));
        }
        if admin_all_permission.as_str().is_empty() {
            return Err(ScopeError::invalid("admin_all_permission cannot be empty"));
        }
        let resources = ResourceKind::ALL.map(|kind| {
            overrides
                .remove(&kind)
                .unwrap_or_else(|| kind.default_policy())
        });
        for (kind, policy) in ResourceKind::ALL.iter().zip(resources.iter()) {
            policy.validate(kind.as_str())?;
        }
        Ok(Self {
            admin_all_permission,
            editor_levels,
            resources,
        })
    }

    /// Policy of a resource kind.
    pub fn policy(&self, kind: ResourceKind) -> &ResourcePolicy {
        &self.resources[kind.index()]
    }

    /// Permission that resolves to `admin` on every deployment.
    pub fn admin_all_permission(&self) -> &Permission {
        &self.admin_all_permission
    }

    /// Levels allowed to edit deployment-scoped resources.
    pub fn editor_levels(&self) -> &SufficientLevels {
        &self.editor_levels
    }

    /// Returns `true` if `user` holds the blanket deployment permission.
    pub fn is_admin_all(&self, user: &User) -> bool {
        user.has_permission(self.admin_all_permission.as_str())
    }

    /// Iterate over every kind and its policy.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &ResourcePolicy)> {
        ResourceKind::ALL.into_iter().zip(self.resources.iter())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            admin_all_permission: Permission::new(ADMIN_ALL_DEPLOYMENTS),
            editor_levels: SufficientLevels::editors(),
            resources: ResourceKind::ALL.map(|kind| kind.default_policy()),
        }
    }
}
