//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use escooly_core::{Error, Notification, Notifier};

use super::print_profile;
use crate::context::AppContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, env = "ESCOOLY_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "ESCOOLY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn run(args: LoginArgs, ctx: &AppContext) -> Result<()> {
    output::info("Logging in...");

    let email = args.email.unwrap_or_default();
    let password = args.password.unwrap_or_default();

    let response = match ctx.manager.login(email, password).await {
        Ok(response) => response,
        Err(err) => {
            print_field_errors(&err);
            return Err(err).context("Failed to login");
        }
    };

    let welcome = response
        .user
        .as_ref()
        .and_then(|user| user.display_name())
        .map(|name| format!("Welcome, {}", name))
        .unwrap_or_default();
    ctx.notifier
        .notify(Notification::success("Logged in", welcome));

    println!();
    if let Some(user) = &response.user {
        print_profile(user);
    }
    output::field("Session", &ctx.store.path().display().to_string());

    Ok(())
}

/// Show which form fields were rejected, locally or by the server.
fn print_field_errors(err: &Error) {
    if let Error::Precondition(precondition) = err
        && let Some(field) = precondition.field()
    {
        output::field(field, &precondition.to_string());
    }

    if let Some(errors) = err.field_errors() {
        for (field, message) in errors.iter().filter(|(_, m)| !m.is_empty()) {
            output::field(field, message);
        }
    }
}
