//! CLI argument definitions.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser};

use trivio::{ApiUrl, Credentials, SessionConfig, TokenSession};

use crate::commands::Command;

/// Resilient API calls from the command line.
#[derive(Parser, Debug)]
#[command(name = "trivio")]
#[command(author, version = env!("TRIVIO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection and identity options shared by session commands.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// API base URL
    #[arg(long, env = "TRIVIO_API_URL", default_value = "http://localhost:8000/api/v1")]
    pub api_url: String,

    /// Username to log in with
    #[arg(long, env = "TRIVIO_USERNAME")]
    pub username: String,

    /// Password to log in with
    #[arg(long, env = "TRIVIO_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Login endpoint, relative to the API URL
    #[arg(long, default_value = trivio::auth::DEFAULT_LOGIN_PATH)]
    pub login_path: String,

    /// Refresh endpoint, relative to the API URL
    #[arg(long, default_value = trivio::auth::DEFAULT_REFRESH_PATH)]
    pub refresh_path: String,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,
}

impl SessionArgs {
    pub fn session(&self) -> Result<TokenSession> {
        let base_url = ApiUrl::new(&self.api_url).context("Invalid API URL")?;
        let mut config = SessionConfig::new(
            base_url,
            Credentials::new(&self.username, &self.password),
        )
        .with_login_path(&self.login_path)
        .with_refresh_path(&self.refresh_path);

        if let Some(secs) = self.timeout {
            config = config.with_timeout(seconds(secs)?);
        }

        TokenSession::new(config).context("Failed to create session")
    }
}

/// Parse a non-negative number of seconds.
pub fn seconds(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid duration: {}s", secs))
}
