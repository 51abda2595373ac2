//! Integration tests for sdr
//!
//! These tests require a running splunkd.
//!
//! Run with:
//! ```bash
//! # Start Splunk Enterprise
//! docker run -d --name splunk -p 8089:8089 \
//!     -e SPLUNK_START_ARGS=--accept-license \
//!     -e SPLUNK_PASSWORD=changeme123 \
//!     splunk/splunk:latest
//!
//! # Run tests
//! SPLUNKD_TEST_HOST=localhost SPLUNKD_TEST_USERNAME=admin \
//!     SPLUNKD_TEST_PASSWORD=changeme123 cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the path to the sdr binary
fn sdr_binary() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_sdr") {
        return PathBuf::from(path);
    }

    let target = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target");

    let debug = target.join("debug/sdr");
    if debug.exists() {
        return debug;
    }
    target.join("release/sdr")
}

/// Connection settings for the server under test
struct TestServer {
    host: String,
    port: String,
    username: String,
    password: String,
}

fn test_server() -> Option<TestServer> {
    Some(TestServer {
        host: std::env::var("SPLUNKD_TEST_HOST").ok()?,
        port: std::env::var("SPLUNKD_TEST_PORT").unwrap_or_else(|_| "8089".to_string()),
        username: std::env::var("SPLUNKD_TEST_USERNAME").ok()?,
        password: std::env::var("SPLUNKD_TEST_PASSWORD").ok()?,
    })
}

/// Run sdr with an isolated config directory and no inherited SPLUNKD_* settings
fn run_sdr(args: &[&str], config_dir: &Path) -> Output {
    let mut cmd = Command::new(sdr_binary());
    cmd.args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("SPLUNKD_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("SPLUNKD_CONFIG_DIR", config_dir);
    cmd.output().expect("Failed to execute sdr command")
}

/// Create a default profile for the test server
fn setup_profile(autologin: bool) -> Option<(TempDir, TestServer)> {
    let server = test_server()?;
    let config_dir = tempfile::tempdir().ok()?;

    let mut args = vec![
        "--host",
        &server.host,
        "--port",
        &server.port,
        "--username",
        &server.username,
        "--password",
        &server.password,
    ];
    if autologin {
        args.push("--autologin");
    }
    args.extend(["profile", "set", "test", "--default"]);

    let output = run_sdr(&args, config_dir.path());
    if !output.status.success() {
        eprintln!(
            "Failed to set profile: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    Some((config_dir, server))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

mod profiles {
    use super::*;

    #[test]
    fn test_profile_set_list_remove() {
        let config_dir = tempfile::tempdir().unwrap();

        let output = run_sdr(
            &["--host", "splunk.example.com", "--token", "Splunk abc", "profile", "set", "prod"],
            config_dir.path(),
        );
        assert!(output.status.success());

        let output = run_sdr(&["profile", "list", "--json"], config_dir.path());
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["profiles"][0]["name"], "prod");
        assert_eq!(json["profiles"][0]["endpoint"], "https://splunk.example.com:8089");
        assert!(!stdout(&output).contains("Splunk abc"));

        let output = run_sdr(&["profile", "remove", "prod"], config_dir.path());
        assert!(output.status.success());

        let output = run_sdr(&["profile", "remove", "prod"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_profile_set_rejects_bad_sharing() {
        let config_dir = tempfile::tempdir().unwrap();
        let output = run_sdr(&["--sharing", "everyone", "profile", "set", "x"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }
}

mod session {
    use super::*;

    #[test]
    fn test_login_prints_token() {
        let Some((config_dir, _server)) = setup_profile(false) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(&["login", "--json"], config_dir.path());
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert!(json["token"].as_str().unwrap().starts_with("Splunk "));
    }

    #[test]
    fn test_wrong_password_is_auth_error() {
        let Some((config_dir, _server)) = setup_profile(false) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(&["--password", "wrong", "login"], config_dir.path());
        assert_eq!(output.status.code(), Some(4));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Login failed."));
    }

    #[test]
    fn test_request_without_login_is_aborted() {
        let Some((config_dir, _server)) = setup_profile(false) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(&["get", "server/info"], config_dir.path());
        assert_eq!(output.status.code(), Some(4));
        assert!(String::from_utf8_lossy(&output.stderr).contains("not logged in"));
    }

    #[test]
    fn test_autologin_get() {
        let Some((config_dir, _server)) = setup_profile(true) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(&["get", "server/info", "--json"], config_dir.path());
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["status"], 200);
    }

    #[test]
    fn test_autologin_recovers_from_stale_token() {
        let Some((config_dir, _server)) = setup_profile(true) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(
            &["--no-color", "--token", "Splunk expired", "get", "server/info"],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert!(stdout(&output).starts_with("HTTP 200"));
    }
}

mod resources {
    use super::*;

    #[test]
    fn test_missing_resource_is_not_found() {
        let Some((config_dir, _server)) = setup_profile(true) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };

        let output = run_sdr(
            &["--sharing", "system", "get", "saved/searches/does not exist"],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_saved_search_lifecycle() {
        let Some((config_dir, server)) = setup_profile(true) else {
            eprintln!("Skipping: splunkd test server not configured");
            return;
        };
        let name = format!("sdr test {}", std::process::id());
        let ns = ["--owner", server.username.as_str(), "--app", "search"];

        let mut args = ns.to_vec();
        args.extend(["post", "saved/searches", "-a"]);
        let name_arg = format!("name={name}");
        args.push(&name_arg);
        args.extend(["-a", "search=search index=_internal | head 1"]);
        let output = run_sdr(&args, config_dir.path());
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let path = format!("saved/searches/{name}");
        let mut args = ns.to_vec();
        args.extend(["get", &path]);
        assert!(run_sdr(&args, config_dir.path()).status.success());

        let mut args = ns.to_vec();
        args.extend(["delete", &path]);
        assert!(run_sdr(&args, config_dir.path()).status.success());

        let mut args = ns.to_vec();
        args.extend(["get", &path]);
        assert_eq!(run_sdr(&args, config_dir.path()).status.code(), Some(5));
    }
}
