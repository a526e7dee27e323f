//! Level resolution

use anyhow::Result;
use clap::Args;
use deploygate_authorization::EngineConfig;
use deploygate_core::{DeploymentId, SufficientLevels};
use tracing::debug;

use super::{access_control, print_json, CallerArgs, Decision, SnapshotArgs};

/// Arguments of `deploygate resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Deployment id
    #[arg(long)]
    pub deployment: String,

    /// Acceptable levels, comma separated; omit to only resolve
    #[arg(long, value_delimiter = ',')]
    pub levels: Vec<String>,

    #[command(flatten)]
    pub caller: CallerArgs,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Resolve the caller's level and print the decision.
pub async fn run(args: ResolveArgs, config: &EngineConfig) -> Result<()> {
    let access = access_control(args.snapshot.load()?, config)?;
    let user = args.caller.to_user();
    let deployment = DeploymentId::new(args.deployment);

    let result = if args.levels.is_empty() {
        access.resolve_level(&deployment, &user, None).await
    } else {
        match SufficientLevels::parse(&args.levels) {
            Ok(acceptable) => access.require_level(&deployment, &user, &acceptable).await,
            Err(err) => Err(err),
        }
    };
    debug!(deployment = %deployment, ok = result.is_ok(), "level resolved");
    print_json(&Decision::from_result(result)?)
}
