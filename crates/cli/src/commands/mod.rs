//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Every request command builds a session from the selected profile and the
//! connection flags, then prints the response.

use clap::{Parser, Subcommand};
use splunkd_core::{ConfigManager, Params};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod connection;
mod delete;
mod get;
mod login;
mod post;
mod profile;
mod request;

pub use connection::ConnectionArgs;

/// sdr - splunkd REST client
///
/// Issues authenticated requests against a splunkd management port, with
/// namespace-aware paths and automatic re-login.
#[derive(Parser, Debug)]
#[command(name = "sdr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage saved connection profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Log in and print the session token
    Login(login::LoginArgs),

    /// GET a resource
    Get(get::GetArgs),

    /// POST to a resource
    Post(post::PostArgs),

    /// DELETE a resource
    Delete(delete::DeleteArgs),

    /// Send a request with any method, headers and body
    Request(request::RequestArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json || json_by_default(),
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, &cli.connection, output_config),
        Commands::Login(args) => login::execute(args, &cli.connection, output_config),
        Commands::Get(args) => get::execute(args, &cli.connection, output_config),
        Commands::Post(args) => post::execute(args, &cli.connection, output_config),
        Commands::Delete(args) => delete::execute(args, &cli.connection, output_config),
        Commands::Request(args) => request::execute(args, &cli.connection, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}

/// `defaults.output = "json"` in the config file
fn json_by_default() -> bool {
    ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.defaults.output == "json")
        .unwrap_or(false)
}

/// Print `err` and pick the exit code from the splunkd error inside it
pub(crate) fn fail(formatter: &Formatter, err: anyhow::Error) -> ExitCode {
    formatter.error(&format!("{err:#}"));
    exit_code_for(&err)
}

pub(crate) fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<splunkd_core::Error>())
        .map(ExitCode::from)
        .unwrap_or(ExitCode::GeneralError)
}

/// Parse a `key=value` query or form argument
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// Parse a `Name: value` header
pub(crate) fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected 'Name: value', got '{s}'")),
    }
}

/// Collect `key=value` pairs into request parameters, keeping their order
pub(crate) fn params_from(pairs: &[(String, String)]) -> Params {
    pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("output_mode=json").unwrap(),
            ("output_mode".to_string(), "json".to_string())
        );
        assert_eq!(
            parse_key_value("search=search index=main").unwrap(),
            ("search".to_string(), "search index=main".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Content-Type: text/plain").unwrap(),
            ("Content-Type".to_string(), "text/plain".to_string())
        );
        assert_eq!(
            parse_header("X-Time:12:30").unwrap(),
            ("X-Time".to_string(), "12:30".to_string())
        );
        assert!(parse_header("no colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_params_keep_order_and_repeats() {
        let pairs = vec![
            ("tag".to_string(), "a".to_string()),
            ("count".to_string(), "5".to_string()),
            ("tag".to_string(), "b".to_string()),
        ];
        assert_eq!(params_from(&pairs).encode(), "tag=a&count=5&tag=b");
    }

    #[test]
    fn test_exit_code_from_error_chain() {
        let err = anyhow::Error::new(splunkd_core::Error::Authentication("Login failed.".into()))
            .context("login to localhost:8089");
        assert_eq!(exit_code_for(&err), ExitCode::AuthError);

        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_parse_get_with_connection_flags() {
        let cli = Cli::try_parse_from([
            "sdr",
            "--host",
            "splunk.example.com",
            "--owner",
            "admin",
            "get",
            "saved/searches",
            "-a",
            "count=0",
        ])
        .unwrap();
        assert_eq!(cli.connection.host.as_deref(), Some("splunk.example.com"));
        assert_eq!(cli.connection.owner.as_deref(), Some("admin"));
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.path, "saved/searches");
                assert_eq!(args.args, vec![("count".to_string(), "0".to_string())]);
            }
            other => panic!("expected get, got {other:?}"),
        }
    }
}
