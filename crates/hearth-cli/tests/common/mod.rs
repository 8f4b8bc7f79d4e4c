use std::path::Path;
use std::process::{Command, Output};

use wiremock::MockServer;

/// Identity API base URL served by a mock server.
pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api/v1", server.address().port())
}

/// Run the CLI binary against `api_url`, storing the token at `storage`.
pub fn run_cli(args: &[&str], storage: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hearth"));
    cmd.args(args);
    cmd.env("HEARTH_API_URL", api_url);
    cmd.env("HEARTH_STORAGE", storage);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], storage: &Path, api_url: &str) -> String {
    let output = run_cli(args, storage, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str], storage: &Path, api_url: &str) -> String {
    let output = run_cli(args, storage, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
