//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use chrono::SecondsFormat;
use clap::Args;

use escooly_core::AuthState;

use super::print_profile;
use crate::context::AppContext;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the stored profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, ctx: &AppContext) -> Result<()> {
    let AuthState::Authenticated { user } = ctx.manager.restore().await else {
        bail!("No active session. Run 'escooly login' first.");
    };

    if args.json {
        return output::json_pretty(&user);
    }

    match &user {
        Some(user) => print_profile(user),
        None => output::field("User", "(no profile stored)"),
    }
    output::field("Session", &ctx.store.path().display().to_string());

    let updated = ctx
        .store
        .updated_at()
        .context("Failed to read session file")?;
    if let Some(updated) = updated {
        output::field(
            "Updated",
            &updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }

    Ok(())
}
