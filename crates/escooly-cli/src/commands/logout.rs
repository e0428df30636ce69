//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use escooly_core::{Notification, Notifier};

use crate::context::AppContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &AppContext) -> Result<()> {
    output::info("Logging out...");

    ctx.manager.logout().await;

    ctx.notifier
        .notify(Notification::success("Logged out", "Stored session cleared"));
    Ok(())
}
