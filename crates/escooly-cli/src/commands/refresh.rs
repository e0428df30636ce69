//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use super::require_session;
use crate::context::AppContext;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, ctx: &AppContext) -> Result<()> {
    require_session(ctx).await?;
    output::info("Refreshing session...");

    let response = ctx
        .manager
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed");
    output::field("Token type", response.token_type.as_str());

    Ok(())
}
