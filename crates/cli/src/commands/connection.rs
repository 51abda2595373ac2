//! Connection flags and session construction
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! the selected (or default) profile, then flags and `SPLUNKD_*` variables.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use splunkd_core::{Context, ContextConfig, ProfileManager};

/// Flags describing which splunkd to talk to and as whom
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Saved profile to start from
    #[arg(long, global = true, env = "SPLUNKD_PROFILE")]
    pub profile: Option<String>,

    /// http or https
    #[arg(long, global = true, env = "SPLUNKD_SCHEME")]
    pub scheme: Option<String>,

    /// Host name or IP address of splunkd
    #[arg(long, global = true, env = "SPLUNKD_HOST")]
    pub host: Option<String>,

    /// Management port
    #[arg(long, global = true, env = "SPLUNKD_PORT")]
    pub port: Option<u16>,

    #[arg(long, global = true, env = "SPLUNKD_USERNAME")]
    pub username: Option<String>,

    #[arg(long, global = true, env = "SPLUNKD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Session token from an earlier login
    #[arg(long, global = true, env = "SPLUNKD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log in automatically, and again when the session expires
    #[arg(long, global = true, env = "SPLUNKD_AUTOLOGIN")]
    pub autologin: bool,

    /// Namespace owner
    #[arg(long, global = true, env = "SPLUNKD_OWNER")]
    pub owner: Option<String>,

    /// Namespace app
    #[arg(long, global = true, env = "SPLUNKD_APP")]
    pub app: Option<String>,

    /// Namespace sharing: user, app, global or system
    #[arg(long, global = true, env = "SPLUNKD_SHARING")]
    pub sharing: Option<String>,

    /// PEM client certificate chain
    #[arg(long, global = true, env = "SPLUNKD_CERT_FILE")]
    pub cert_file: Option<PathBuf>,

    /// PEM client key (defaults to --cert-file)
    #[arg(long, global = true, env = "SPLUNKD_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SPLUNKD_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Verify the server certificate
    #[arg(long, global = true, env = "SPLUNKD_VERIFY")]
    pub verify: bool,
}

impl ConnectionArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, mut config: ContextConfig) -> ContextConfig {
        if let Some(scheme) = &self.scheme {
            config.scheme = scheme.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        overlay(&mut config.username, &self.username);
        overlay(&mut config.password, &self.password);
        overlay(&mut config.token, &self.token);
        overlay(&mut config.owner, &self.owner);
        overlay(&mut config.app, &self.app);
        overlay(&mut config.sharing, &self.sharing);
        overlay(&mut config.cert_file, &self.cert_file);
        overlay(&mut config.key_file, &self.key_file);
        overlay(&mut config.timeout_secs, &self.timeout);
        config.autologin |= self.autologin;
        config.verify |= self.verify;
        config
    }

    /// Settings for this invocation: profile (named or default) plus flags
    pub fn resolve(&self, profiles: &ProfileManager) -> anyhow::Result<ContextConfig> {
        let base = match &self.profile {
            Some(name) => profiles.get(name)?.connection,
            None => profiles
                .default_profile()?
                .map(|profile| profile.connection)
                .unwrap_or_default(),
        };
        Ok(self.apply(base))
    }

    /// Build a session over the default transport
    pub fn context(&self) -> anyhow::Result<Context> {
        let profiles = ProfileManager::new()?;
        let config = self.resolve(&profiles)?;
        tracing::debug!(
            host = %config.host,
            port = config.port,
            autologin = config.autologin,
            "building session"
        );
        splunkd_transport::context(&config)
            .with_context(|| format!("cannot set up a session for {}:{}", config.host, config.port))
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}
