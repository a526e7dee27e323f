//! Policy file validation

use anyhow::{Context, Result};
use deploygate_authorization::EngineConfig;
use tracing::info;

/// Validate `config` and print one line per resource kind.
pub fn run(config: &EngineConfig) -> Result<()> {
    let table = config.to_table().context("policy configuration is invalid")?;

    println!("reload: {}", config.reload);
    println!("admin-all permission: {}", table.admin_all_permission());
    println!("editor levels: [{}]", table.editor_levels());
    for (kind, policy) in table.iter() {
        println!(
            "{:<22} full={:<22} manage={:<22} listed={:<5} creator={:<5} association={}",
            kind.as_str(),
            policy.full_access_permission.as_str(),
            policy.manage_permission().as_str(),
            policy.listed_flag,
            policy.tracks_creator,
            policy.association.field().unwrap_or("-"),
        );
    }
    info!("policy configuration is valid");
    Ok(())
}
