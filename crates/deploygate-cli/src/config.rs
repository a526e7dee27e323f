//! Policy file loading for the CLI

use std::path::Path;

use anyhow::{Context, Result};
use deploygate_authorization::EngineConfig;
use tracing::{debug, info};

/// Load the policy file, falling back to built-in defaults when it is absent,
/// then apply environment overrides.
pub fn load(path: &Path) -> Result<EngineConfig> {
    let mut config = if path.exists() {
        info!(path = %path.display(), "loading policy file");
        EngineConfig::load_from_file(path)
            .with_context(|| format!("failed to load policy file {}", path.display()))?
    } else {
        debug!(path = %path.display(), "no policy file, using built-in defaults");
        EngineConfig::default()
    };
    config
        .merge_with_env()
        .context("invalid DEPLOYGATE_* environment override")?;
    Ok(config)
}
