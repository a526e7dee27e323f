//! Single-item visibility

use anyhow::{Context, Result};
use clap::Args;
use deploygate_authorization::{AccessControl, EngineConfig, ResourceKind};
use deploygate_core::{Check, Platform, ScopedResource, Sensor, Timeseries, User, VocabResource};
use serde::de::DeserializeOwned;

use super::{access_control, print_json, CallerArgs, Decision, SnapshotArgs};

/// Arguments of `deploygate visible`.
#[derive(Args, Debug)]
pub struct VisibleArgs {
    /// Resource kind (`units`, `checks`, `platforms`, `sensors`, ...)
    #[arg(long)]
    pub kind: String,

    /// Resource document as JSON
    #[arg(long)]
    pub resource: String,

    #[command(flatten)]
    pub caller: CallerArgs,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Decide whether the resource is visible to the caller and print the decision.
pub async fn run(args: VisibleArgs, config: &EngineConfig) -> Result<()> {
    let kind: ResourceKind = args.kind.parse()?;
    let access = access_control(args.snapshot.load()?, config)?;
    let user = args.caller.to_user();

    let result = match kind {
        ResourceKind::Checks => check::<Check>(&access, kind, &args.resource, &user).await?,
        ResourceKind::Platforms => check::<Platform>(&access, kind, &args.resource, &user).await?,
        ResourceKind::Sensors => check::<Sensor>(&access, kind, &args.resource, &user).await?,
        ResourceKind::Timeseries => {
            check::<Timeseries>(&access, kind, &args.resource, &user).await?
        }
        _ => check::<VocabResource>(&access, kind, &args.resource, &user).await?,
    };
    print_json(&Decision::from_result(result.map(|()| kind))?)
}

async fn check<R>(
    access: &AccessControl,
    kind: ResourceKind,
    json: &str,
    user: &User,
) -> Result<deploygate_core::Result<()>>
where
    R: ScopedResource + DeserializeOwned + Sync,
{
    let resource: R =
        serde_json::from_str(json).with_context(|| format!("invalid {kind} resource"))?;
    Ok(access.check_visibility(kind, &resource, user).await)
}
