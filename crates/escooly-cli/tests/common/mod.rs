use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock backend plus an isolated home directory for the session file.
pub struct TestEnv {
    pub server: MockServer,
    pub home: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            home: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn session_file(&self) -> PathBuf {
        self.home.path().join("session.json")
    }

    /// Parsed session file contents.
    pub fn stored(&self) -> Value {
        let json = std::fs::read_to_string(self.session_file()).expect("No session file");
        serde_json::from_str(&json).expect("Invalid session file")
    }

    /// Run the CLI against this environment.
    pub async fn run(&self, args: &[&str]) -> Output {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let home = self.home.path().to_path_buf();
        let api_url = self.server.uri();
        let session_file = self.session_file();

        tokio::task::spawn_blocking(move || {
            run_cli_with_env(&args, &home, &api_url, Some(&session_file))
        })
        .await
        .expect("CLI task panicked")
    }

    /// Run the CLI and expect success, returning stdout.
    pub async fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure, returning stdout and stderr combined.
    pub async fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if output.status.success() {
            panic!("CLI command should have failed: {:?}", args);
        }
        format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }

    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "access_token": "T1",
                    "token_type": "Bearer",
                    "user": user()
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn login(&self) {
        self.mount_login().await;
        self.run_success(&["login", "--email", "a@b.com", "--password", "secret12"])
            .await;
    }
}

pub fn user() -> Value {
    json!({
        "id": 7,
        "first_name": "Amina",
        "last_name": "Haddad",
        "email": "a@b.com",
        "roles": [{ "id": 2, "name": "admin" }]
    })
}

/// Run the CLI binary with an isolated HOME and data directory.
pub fn run_cli_with_env(
    args: &[String],
    home: &Path,
    api_url: &str,
    session_file: Option<&Path>,
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_escooly"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("ESCOOLY_API_URL", api_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("ESCOOLY_EMAIL");
    cmd.env_remove("ESCOOLY_PASSWORD");
    cmd.env_remove("RUST_LOG");
    match session_file {
        Some(path) => cmd.env("ESCOOLY_SESSION_FILE", path),
        None => cmd.env_remove("ESCOOLY_SESSION_FILE"),
    };
    cmd.output().expect("Failed to execute CLI")
}
