//! CLI integration tests against a mock backend.
//!
//! Each test gets its own wiremock server and temporary home directory, so
//! the session file never leaks between tests or into the real data dir.

mod common;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{TestEnv, run_cli_with_env, user};

#[tokio::test(flavor = "multi_thread")]
async fn test_login_stores_session() {
    let env = TestEnv::start().await;
    env.mount_login().await;

    let stdout = env
        .run_success(&["login", "--email", "a@b.com", "--password", "secret12"])
        .await;

    assert!(stdout.contains("Amina Haddad"));
    assert!(stdout.contains("admin"));

    let stored = env.stored();
    assert_eq!(stored["entries"]["auth_token"], "T1");
    assert_eq!(stored["entries"]["token_type"], "Bearer");
    assert!(stored["entries"].get("refresh_token").is_none());

    let user_data: serde_json::Value =
        serde_json::from_str(stored["entries"]["user_data"].as_str().unwrap()).unwrap();
    assert_eq!(user_data, user());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_validation_errors() {
    let env = TestEnv::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["These credentials do not match our records."],
                "password": ["The password must be at least 8 characters.", "Other."]
            }
        })))
        .mount(&env.server)
        .await;

    let output = env
        .run_failure(&["login", "--email", "a@b.com", "--password", "wrongpass1"])
        .await;

    assert!(output.contains("Validation Error"));
    assert!(output.contains("email: These credentials do not match our records."));
    assert!(output.contains("password: The password must be at least 8 characters."));
    assert!(!output.contains("Other."));
    assert!(!env.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_without_email() {
    let env = TestEnv::start().await;

    let output = env.run_failure(&["login", "--password", "secret12"]).await;

    assert!(output.contains("email must be provided"));
    assert!(env.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_with_malformed_email() {
    let env = TestEnv::start().await;

    let output = env
        .run_failure(&["login", "--email", "amina", "--password", "secret12"])
        .await;

    assert!(output.contains("email: email address is not valid"));
    assert!(env.server.received_requests().await.unwrap().is_empty());
    assert!(!env.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_with_short_password() {
    let env = TestEnv::start().await;

    let output = env
        .run_failure(&["login", "--email", "a@b.com", "--password", "short"])
        .await;

    assert!(output.contains("password: password must be at least 8 characters"));
    assert!(env.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_reads_store_only() {
    let env = TestEnv::start().await;
    env.login().await;

    let stdout = env.run_success(&["whoami"]).await;

    assert!(stdout.contains("Amina Haddad"));
    assert!(stdout.contains("a@b.com"));
    assert!(stdout.contains("Updated"));
    assert_eq!(env.server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_json() {
    let env = TestEnv::start().await;
    env.login().await;

    let stdout = env.run_success(&["whoami", "--json"]).await;
    let printed: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(printed, user());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_without_session() {
    let env = TestEnv::start().await;

    let output = env.run_failure(&["whoami"]).await;

    assert!(output.contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_clears_session() {
    let env = TestEnv::start().await;
    env.login().await;

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "bye" })))
        .expect(1)
        .mount(&env.server)
        .await;

    let stdout = env.run_success(&["logout"]).await;
    assert!(!stdout.contains("✗"));
    assert!(!env.session_file().exists());

    env.run_failure(&["whoami"]).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_when_server_fails() {
    let env = TestEnv::start().await;
    env.login().await;

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;

    let output = env.run(&["logout"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Logged out"));
    assert!(!env.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_me_updates_profile() {
    let env = TestEnv::start().await;
    env.login().await;

    let mut updated = user();
    updated["first_name"] = json!("Amina-Zahra");
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": updated })))
        .mount(&env.server)
        .await;

    let stdout = env.run_success(&["me"]).await;
    assert!(stdout.contains("Amina-Zahra Haddad"));

    let stdout = env.run_success(&["whoami", "--json"]).await;
    let printed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(printed["first_name"], "Amina-Zahra");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_is_cleared() {
    let env = TestEnv::start().await;
    env.login().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthenticated." })),
        )
        .mount(&env.server)
        .await;

    let output = env.run_failure(&["me"]).await;

    assert!(output.contains("Your session has expired. Please log in again."));
    assert!(!env.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_replaces_token() {
    let env = TestEnv::start().await;
    env.login().await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "T2", "token_type": "Bearer" })),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    let stdout = env.run_success(&["refresh"]).await;
    assert!(stdout.contains("Session refreshed"));

    let stored = env.stored();
    assert_eq!(stored["entries"]["auth_token"], "T2");
    let user_data: serde_json::Value =
        serde_json::from_str(stored["entries"]["user_data"].as_str().unwrap()).unwrap();
    assert_eq!(user_data, user());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_without_session() {
    let env = TestEnv::start().await;

    let output = env.run_failure(&["refresh"]).await;

    assert!(output.contains("No active session"));
    assert!(env.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_server() {
    let env = TestEnv::start().await;

    let output = env
        .run_failure(&[
            "login",
            "--email",
            "a@b.com",
            "--password",
            "secret12",
            "--api-url",
            "http://127.0.0.1:1",
            "--timeout-secs",
            "2",
        ])
        .await;

    assert!(output.contains("Unable to connect to the server"));
    assert!(!env.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_api_url() {
    let env = TestEnv::start().await;

    let output = env
        .run_failure(&["whoami", "--api-url", "ftp://example.com"])
        .await;

    assert!(output.contains("Invalid API URL"));
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_default_session_location() {
    let env = TestEnv::start().await;
    env.mount_login().await;

    let args: Vec<String> = ["login", "--email", "a@b.com", "--password", "secret12"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let home = env.home.path().to_path_buf();
    let api_url = env.server.uri();
    let output = tokio::task::spawn_blocking(move || run_cli_with_env(&args, &home, &api_url, None))
        .await
        .unwrap();

    assert!(output.status.success());
    assert!(
        env.home
            .path()
            .join("data")
            .join("escooly")
            .join("session.json")
            .exists()
    );
}
