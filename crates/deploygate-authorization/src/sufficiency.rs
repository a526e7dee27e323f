//! Level sufficiency enforcement

use deploygate_core::{AccessLevel, Deployment, Result, ScopeError, SufficientLevels, User};

use crate::policy::PolicyTable;
use crate::resolver::AccessLevelResolver;

/// Requires a resolved level to be one of an acceptable set.
#[derive(Debug, Clone, Copy)]
pub struct LevelSufficiencyGuard<'a> {
    table: &'a PolicyTable,
    resolver: AccessLevelResolver<'a>,
}

impl<'a> LevelSufficiencyGuard<'a> {
    /// Create a guard over a policy table.
    pub fn new(table: &'a PolicyTable) -> Self {
        Self {
            table,
            resolver: AccessLevelResolver::new(table),
        }
    }

    /// Resolve the caller's level on `deployment` and require it in `allowed`.
    ///
    /// An empty `allowed` set accepts nobody.
    pub fn require_level(
        &self,
        deployment: &Deployment,
        user: &User,
        allowed: &SufficientLevels,
    ) -> Result<AccessLevel> {
        self.resolver.resolve_level(deployment, user, Some(allowed))
    }

    /// Require one of the configured editor levels on `deployment`.
    pub fn require_editor(&self, deployment: &Deployment, user: &User) -> Result<AccessLevel> {
        self.require_level(deployment, user, self.table.editor_levels())
    }

    /// Succeed when any deployment of a multi-valued association passes.
    ///
    /// On failure the most specific error is returned: an insufficient level
    /// on one deployment wins over having no access to another. Without any
    /// deployment the caller is forbidden.
    pub fn require_any_level<'d>(
        &self,
        deployments: impl IntoIterator<Item = &'d Deployment>,
        user: &User,
        allowed: &SufficientLevels,
    ) -> Result<AccessLevel> {
        let mut failure: Option<ScopeError> = None;
        for deployment in deployments {
            match self.require_level(deployment, user, allowed) {
                Ok(level) => return Ok(level),
                Err(err) => failure = Some(more_specific(failure, err)),
            }
        }
        Err(failure.unwrap_or_else(|| {
            ScopeError::forbidden("The resource is not part of any deployment you can access")
        }))
    }

    /// Require one of the editor levels on any of `deployments`.
    pub fn require_editor_on_any<'d>(
        &self,
        deployments: impl IntoIterator<Item = &'d Deployment>,
        user: &User,
    ) -> Result<AccessLevel> {
        self.require_any_level(deployments, user, self.table.editor_levels())
    }
}

fn more_specific(current: Option<ScopeError>, candidate: ScopeError) -> ScopeError {
    match current {
        Some(existing @ ScopeError::InsufficientDeploymentAccessLevel { .. }) => existing,
        Some(existing)
            if !matches!(candidate, ScopeError::InsufficientDeploymentAccessLevel { .. }) =>
        {
            existing
        }
        _ => candidate,
    }
}
