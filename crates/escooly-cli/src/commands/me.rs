//! Profile command implementation.

use anyhow::{Context, Result};
use clap::Args;

use super::{print_profile, require_session};
use crate::context::AppContext;
use crate::output;

#[derive(Args, Debug)]
pub struct MeArgs {
    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: MeArgs, ctx: &AppContext) -> Result<()> {
    require_session(ctx).await?;

    let user = ctx
        .manager
        .refresh_profile()
        .await
        .context("Failed to fetch profile")?;

    if args.json {
        output::json_pretty(&user)
    } else {
        print_profile(&user);
        Ok(())
    }
}
