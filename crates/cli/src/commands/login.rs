//! login command - Authenticate and print the session token
//!
//! The token can be saved into a profile or passed to later invocations via
//! `--token` / `SPLUNKD_TOKEN`.

use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use splunkd_core::{Profile, ProfileManager};

use super::{fail, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Log in and print the session token
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Store the token in this profile (created if missing)
    #[arg(long)]
    pub save: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginOutput {
    token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

/// Execute the login command
pub fn execute(args: LoginArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(&args, connection) {
        Ok(output) => {
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                formatter.println(&output.token);
                if let Some(profile) = &output.saved_to {
                    formatter.success(&format!("Token saved to profile '{profile}'."));
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, e),
    }
}

fn run(args: &LoginArgs, connection: &ConnectionArgs) -> anyhow::Result<LoginOutput> {
    let mut ctx = connection.context()?;
    let authority = ctx.authority().to_string();
    ctx.login()
        .with_context(|| format!("login to {authority} failed"))?;
    let token = ctx.token().as_str().unwrap_or_default().to_string();

    if let Some(name) = &args.save {
        let profiles = ProfileManager::new()?;
        let mut settings = connection.resolve(&profiles)?;
        settings.token = Some(token.clone());
        profiles.set(Profile::new(name, settings))?;
    }

    Ok(LoginOutput {
        token,
        saved_to: args.save.clone(),
    })
}
