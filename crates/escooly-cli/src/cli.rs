//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, me, refresh, whoami};

/// Command-line client for the escooly session API.
#[derive(Parser, Debug)]
#[command(name = "escooly")]
#[command(author, version = env!("ESCOOLY_VERSION"), about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Backend base URL
    #[arg(
        long,
        env = "ESCOOLY_API_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub api_url: String,

    /// Session file [default: <data dir>/escooly/session.json]
    #[arg(long, env = "ESCOOLY_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Sign out and clear the stored session
    Logout(logout::LogoutArgs),

    /// Show the stored session without contacting the server
    Whoami(whoami::WhoamiArgs),

    /// Fetch the signed-in user's profile
    Me(me::MeArgs),

    /// Exchange the stored token for a fresh one
    Refresh(refresh::RefreshArgs),
}
