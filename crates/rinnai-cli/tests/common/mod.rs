use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "secret123";
pub const THING: &str = "rinnai-thing-123";

/// Run the CLI with a custom HOME and every endpoint pointed at `server`.
pub fn run_cli_with_env(args: &[&str], home: &Path, server: &MockServer) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rinnai"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("RINNAI_COGNITO_ENDPOINT", format!("{}/", server.uri()));
    cmd.env("RINNAI_GRAPHQL_URL", format!("{}/graphql", server.uri()));
    cmd.env("RINNAI_SHADOW_URL", format!("{}/Prod", server.uri()));
    cmd.env("RINNAI_RETRY_DELAY_MS", "10");
    cmd.env_remove("RINNAI_EMAIL");
    cmd.env_remove("RINNAI_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path, server: &MockServer) -> String {
    let output = run_cli_with_env(args, home, server);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with a custom HOME and expect failure; returns stderr.
pub fn run_cli_with_env_failure(args: &[&str], home: &Path, server: &MockServer) -> String {
    let output = run_cli_with_env(args, home, server);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Answer password logins with a token set valid for `expires_in` seconds.
pub async fn mount_login(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "USER_PASSWORD_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "AccessToken": "test-access-token",
                "ExpiresIn": expires_in,
                "IdToken": "test-id-token",
                "RefreshToken": "test-refresh-token",
                "TokenType": "Bearer"
            }
        })))
        .mount(server)
        .await;
}

/// Answer refresh-token renewals with a fresh token pair.
pub async fn mount_renewal(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "AccessToken": "renewed-access-token",
                "ExpiresIn": 3600,
                "IdToken": "renewed-id-token",
                "TokenType": "Bearer"
            }
        })))
        .mount(server)
        .await;
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
