//! Listing predicates

use anyhow::Result;
use clap::Args;
use deploygate_authorization::{EngineConfig, ResourceKind};

use super::{access_control, print_json, CallerArgs, SnapshotArgs};

/// Arguments of `deploygate predicate`.
#[derive(Args, Debug)]
pub struct PredicateArgs {
    /// Resource kind (`units`, `checks`, `platforms`, `sensors`, ...)
    #[arg(long)]
    pub kind: String,

    #[command(flatten)]
    pub caller: CallerArgs,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Print the visibility predicate the caller's listing would carry.
pub async fn run(args: PredicateArgs, config: &EngineConfig) -> Result<()> {
    let kind: ResourceKind = args.kind.parse()?;
    let access = access_control(args.snapshot.load()?, config)?;
    let predicate = access
        .visibility_predicate(kind, &args.caller.to_user())
        .await?;
    print_json(&predicate)
}
