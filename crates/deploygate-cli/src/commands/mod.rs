//! Subcommand implementations

pub mod check_config;
pub mod predicate;
pub mod resolve;
pub mod visible;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use deploygate_authorization::{AccessControl, EngineConfig, PolicyStore};
use deploygate_core::{SnapshotRepository, User, UserId};

/// Identity of the caller a decision is explained for.
#[derive(Args, Debug, Clone)]
pub struct CallerArgs {
    /// Caller id; omit for an anonymous caller
    #[arg(long)]
    pub user: Option<String>,

    /// Global permission held by the caller (repeatable)
    #[arg(long = "permission")]
    pub permissions: Vec<String>,
}

impl CallerArgs {
    /// Build the caller.
    pub fn to_user(&self) -> User {
        let mut user = User {
            id: self.user.as_deref().map(UserId::new),
            ..User::default()
        };
        for permission in &self.permissions {
            user = user.with_permission(permission.as_str());
        }
        user
    }
}

/// Deployments snapshot the decision is made against.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// JSON file holding an array of deployments
    #[arg(long, default_value = ".deploygate/deployments.json")]
    pub snapshot: PathBuf,
}

impl SnapshotArgs {
    /// Load the snapshot repository.
    pub fn load(&self) -> Result<SnapshotRepository> {
        load_snapshot(&self.snapshot)
    }
}

fn load_snapshot(path: &Path) -> Result<SnapshotRepository> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    SnapshotRepository::from_json(&json)
        .with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Access control over a snapshot, with a static policy store.
pub fn access_control(snapshot: SnapshotRepository, config: &EngineConfig) -> Result<AccessControl> {
    let store = PolicyStore::from_config(config).context("invalid policy configuration")?;
    let repo = Arc::new(snapshot);
    Ok(AccessControl::new(repo.clone(), repo, Arc::new(store)))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Outcome of an explained decision.
#[derive(Debug, serde::Serialize)]
pub struct Decision<T: serde::Serialize> {
    /// Whether the operation would be allowed.
    pub allowed: bool,
    /// Result when allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Stable error code when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// HTTP status the gateway would answer with when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Error message when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: serde::Serialize> Decision<T> {
    /// Turn an engine result into a printable decision.
    ///
    /// Non-operational errors (configuration, repository, internal) are not
    /// decisions and are returned as errors.
    pub fn from_result(result: deploygate_core::Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self {
                allowed: true,
                result: Some(value),
                code: None,
                status: None,
                message: None,
            }),
            Err(err) if err.is_operational() => Ok(Self {
                allowed: false,
                result: None,
                code: Some(err.code()),
                status: Some(err.status_code()),
                message: Some(err.to_string()),
            }),
            Err(err) => Err(err.into()),
        }
    }
}
