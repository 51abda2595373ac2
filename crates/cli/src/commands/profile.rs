//! Profile management commands
//!
//! Profiles are named, saved connection settings for a splunkd instance,
//! including credentials or a session token. Settings for `profile set` come
//! from the global connection flags.

use clap::Subcommand;
use serde::Serialize;
use splunkd_core::{ContextConfig, Namespace, Profile, ProfileManager, Scheme};

use super::{fail, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands for managing saved connections
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile from the connection flags
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "local", "prod")
    pub name: String,

    /// Use this profile when --profile is not given
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including user and namespace
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for JSON output (without secrets)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    has_token: bool,
    autologin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sharing: Option<String>,
    default: bool,
}

impl ProfileInfo {
    fn new(profile: &Profile, default: Option<&str>) -> Self {
        let connection = &profile.connection;
        Self {
            name: profile.name.clone(),
            endpoint: profile.endpoint(),
            username: connection.username.clone(),
            has_token: connection.token.as_deref().is_some_and(|t| !t.is_empty()),
            autologin: connection.autologin,
            owner: connection.owner.clone(),
            app: connection.app.clone(),
            sharing: connection.sharing.clone(),
            default: default == Some(profile.name.as_str()),
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub fn execute(cmd: ProfileCommands, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, connection, &manager, &formatter),
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn execute_set(
    args: SetArgs,
    connection: &ConnectionArgs,
    manager: &ProfileManager,
    formatter: &Formatter,
) -> ExitCode {
    if args.name.trim().is_empty() {
        formatter.error("Profile name cannot be empty");
        return ExitCode::UsageError;
    }

    let settings = connection.apply(ContextConfig::default());
    if let Err(msg) = validate(&settings) {
        formatter.error(&msg);
        return ExitCode::UsageError;
    }
    if settings.token.is_none() && (settings.username.is_none() || settings.password.is_none()) {
        formatter.warning("Profile has neither a token nor a username and password");
    }

    let result = manager
        .set(Profile::new(&args.name, settings))
        .and_then(|()| {
            if args.default {
                manager.set_default(&args.name)
            } else {
                Ok(())
            }
        });

    match result {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' configured successfully", args.name),
                });
            } else {
                formatter.success(&format!("Profile '{}' configured successfully.", args.name));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, e.into()),
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let default = match manager.default_profile() {
        Ok(profile) => profile.map(|p| p.name),
        Err(e) => return fail(formatter, e.into()),
    };

    match manager.list() {
        Ok(profiles) => {
            if formatter.is_json() {
                let output = ProfileListOutput {
                    profiles: profiles
                        .iter()
                        .map(|p| ProfileInfo::new(p, default.as_deref()))
                        .collect(),
                };
                formatter.json(&output);
            } else if profiles.is_empty() {
                formatter.println("No profiles configured.");
            } else {
                for profile in &profiles {
                    let marker = if default.as_deref() == Some(profile.name.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    let mut line = format!("{marker} {:<12} {}", profile.name, profile.endpoint());
                    if args.long {
                        let info = ProfileInfo::new(profile, default.as_deref());
                        line.push_str(&formatter.dim(&details(&info)));
                    }
                    formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, e.into()),
    }
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' removed successfully", args.name),
                });
            } else {
                formatter.success(&format!("Profile '{}' removed successfully.", args.name));
            }
            ExitCode::Success
        }
        Err(splunkd_core::Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => fail(formatter, e.into()),
    }
}

/// Reject settings a session could never be built from
fn validate(settings: &ContextConfig) -> Result<(), String> {
    settings
        .scheme
        .parse::<Scheme>()
        .map_err(|e| e.to_string())?;
    Namespace::resolve(
        settings.sharing.as_deref(),
        settings.owner.as_deref(),
        settings.app.as_deref(),
    )
    .map_err(|e| e.to_string())?;
    if settings.key_file.is_some() && settings.cert_file.is_none() {
        return Err("--key-file requires --cert-file".to_string());
    }
    Ok(())
}

fn details(info: &ProfileInfo) -> String {
    let mut parts = Vec::new();
    if let Some(username) = &info.username {
        parts.push(format!("user: {username}"));
    }
    if info.has_token {
        parts.push("token".to_string());
    }
    if info.autologin {
        parts.push("autologin".to_string());
    }
    let namespace = [&info.sharing, &info.owner, &info.app]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>();
    if !namespace.is_empty() {
        parts.push(format!("namespace: {}", namespace.join("/")));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}
