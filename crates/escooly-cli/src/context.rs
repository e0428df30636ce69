//! Wiring from command-line options to a session manager.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use escooly_core::ApiUrl;
use escooly_file::FileStore;
use escooly_http::{ApiClient, ClientConfig, SessionManager};

use crate::cli::GlobalArgs;
use crate::notifier::TerminalNotifier;

/// Everything a command needs.
pub struct AppContext {
    pub manager: SessionManager,
    pub store: Arc<FileStore>,
    pub notifier: Arc<TerminalNotifier>,
}

impl AppContext {
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let api_url = ApiUrl::new(&args.api_url).context("Invalid API URL")?;
        let path = match &args.session_file {
            Some(path) => path.clone(),
            None => default_session_path()?,
        };
        debug!(api_url = %api_url, path = %path.display(), "Using session file");

        let store = Arc::new(FileStore::new(path));
        let notifier = Arc::new(TerminalNotifier);

        let config = ClientConfig::new(api_url)
            .with_timeout(Duration::from_secs(args.timeout_secs))
            .with_user_agent(format!("escooly-cli/{}", env!("ESCOOLY_VERSION")));
        let client = ApiClient::new(config, store.clone(), notifier.clone())
            .context("Failed to build HTTP client")?;

        Ok(Self {
            manager: SessionManager::new(client),
            store,
            notifier,
        })
    }
}

fn default_session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "escooly").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}
