//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod whoami;

use anyhow::{Result, bail};

use escooly_core::UserProfile;

use crate::cli::{Cli, Commands};
use crate::context::AppContext;
use crate::output;

pub async fn handle(cli: Cli) -> Result<()> {
    let ctx = AppContext::new(&cli.global)?;

    match cli.command {
        Commands::Login(args) => login::run(args, &ctx).await,
        Commands::Logout(args) => logout::run(args, &ctx).await,
        Commands::Whoami(args) => whoami::run(args, &ctx).await,
        Commands::Me(args) => me::run(args, &ctx).await,
        Commands::Refresh(args) => refresh::run(args, &ctx).await,
    }
}

/// Restore the stored session, failing when there is none.
async fn require_session(ctx: &AppContext) -> Result<()> {
    if !ctx.manager.restore().await.is_authenticated() {
        bail!("No active session. Run 'escooly login' first.");
    }
    Ok(())
}

fn print_profile(user: &UserProfile) {
    if let Some(id) = user.id() {
        output::field("ID", &id);
    }
    if let Some(name) = user.display_name() {
        output::field("Name", &name);
    }
    if let Some(email) = user.email() {
        output::field("Email", email);
    }
    let roles = user.roles();
    if !roles.is_empty() {
        output::field("Roles", &roles.join(", "));
    }
}
