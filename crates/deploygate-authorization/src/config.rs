//! Engine configuration
//!
//! Loaded from TOML, overridable from the environment, and turned into a
//! validated [`PolicyTable`] before any guard sees it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use deploygate_core::permission::ADMIN_ALL_DEPLOYMENTS;
use deploygate_core::{Permission, Result, ScopeError, SufficientLevels};
use serde::{Deserialize, Serialize};

use crate::policy::{PolicyTable, ResourceKind, ResourcePolicy};

/// Environment variable overriding `admin_all_permission`.
pub const ENV_ADMIN_ALL_PERMISSION: &str = "DEPLOYGATE_ADMIN_ALL_PERMISSION";

/// Environment variable overriding `reload`.
pub const ENV_RELOAD: &str = "DEPLOYGATE_RELOAD";

/// How a [`PolicyStore`](crate::PolicyStore) treats replacement tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// The table is fixed for the lifetime of the process.
    #[default]
    Static,
    /// The table may be swapped at runtime.
    OnDemand,
}

impl fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::OnDemand => f.write_str("on-demand"),
        }
    }
}

impl FromStr for ReloadPolicy {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "static" => Ok(Self::Static),
            "on-demand" => Ok(Self::OnDemand),
            other => Err(ScopeError::invalid(format!(
                "unknown reload policy '{other}', expected 'static' or 'on-demand'"
            ))),
        }
    }
}

/// On-disk configuration of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Reload behaviour of the policy store.
    #[serde(default)]
    pub reload: ReloadPolicy,

    /// Permission that resolves to `admin` on every deployment.
    #[serde(default = "default_admin_all_permission")]
    pub admin_all_permission: Permission,

    /// Level names allowed to edit deployment-scoped resources.
    #[serde(default = "default_editor_levels")]
    pub editor_levels: Vec<String>,

    /// Per-kind overrides keyed by collection name (`units`, `platforms`, ...).
    #[serde(default)]
    pub resources: BTreeMap<String, ResourcePolicy>,
}

fn default_admin_all_permission() -> Permission {
    Permission::new(ADMIN_ALL_DEPLOYMENTS)
}

fn default_editor_levels() -> Vec<String> {
    SufficientLevels::editors()
        .as_slice()
        .iter()
        .map(|level| level.as_str().to_string())
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reload: ReloadPolicy::default(),
            admin_all_permission: default_admin_all_permission(),
            editor_levels: default_editor_levels(),
            resources: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScopeError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DEPLOYGATE_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn merge_with_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(permission) = lookup(ENV_ADMIN_ALL_PERMISSION) {
            self.admin_all_permission = Permission::new(permission);
        }
        if let Some(reload) = lookup(ENV_RELOAD) {
            self.reload = reload.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration without building the table.
    pub fn validate(&self) -> Result<()> {
        self.to_table().map(|_| ())
    }

    /// Build the policy table the guards evaluate against.
    pub fn to_table(&self) -> Result<PolicyTable> {
        let editor_levels = SufficientLevels::parse(&self.editor_levels)
            .map_err(|e| ScopeError::invalid(format!("editor_levels: {e}")))?;
        let overrides = self
            .resources
            .iter()
            .map(|(name, policy)| Ok((name.parse::<ResourceKind>()?, policy.clone())))
            .collect::<Result<BTreeMap<_, _>>>()?;
        PolicyTable::new(self.admin_all_permission.clone(), editor_levels, overrides)
    }
}
