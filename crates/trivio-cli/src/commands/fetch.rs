//! Fetch command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use trivio::{Call, CallOutcome, RetryingRequester, StatusCode};

use crate::cli::seconds;
use crate::output;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL to GET
    pub url: String,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,

    /// Total number of attempts
    #[arg(long, default_value_t = trivio::http::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Wait before the second attempt, in seconds
    #[arg(long, default_value_t = 0.5)]
    pub retry_interval: f64,

    /// Factor the wait grows by after each failed attempt
    #[arg(long, default_value_t = trivio::http::DEFAULT_MULTIPLIER)]
    pub backoff_multiplier: f64,

    /// Upper bound for a single wait, in seconds
    #[arg(long)]
    pub max_interval: Option<f64>,

    /// Status that ends the call without retrying (repeatable)
    #[arg(long = "no-retry-status", value_name = "STATUS")]
    pub no_retry_statuses: Vec<u16>,
}

impl FetchArgs {
    fn call(&self) -> Result<Call> {
        let mut call = Call::get(&self.url)
            .timeout(seconds(self.timeout)?)
            .max_attempts(self.max_attempts)
            .retry_interval(seconds(self.retry_interval)?)
            .backoff_multiplier(self.backoff_multiplier);

        if let Some(max) = self.max_interval {
            call = call.max_interval(seconds(max)?);
        }
        for code in &self.no_retry_statuses {
            let status = StatusCode::from_u16(*code)
                .with_context(|| format!("Invalid HTTP status: {}", code))?;
            call = call.no_retry_status(status);
        }

        Ok(call)
    }
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let call = args.call()?;
    let requester = RetryingRequester::new().context("Failed to create HTTP client")?;

    eprintln!("{}", format!("Fetching {}...", call.url()).dimmed());

    match requester.execute(&call).await.context("Fetch failed")? {
        CallOutcome::Success(body) => output::json_pretty(&body),
        CallOutcome::Rejected { status } => {
            output::warning(&format!("Server answered {} (not retried)", status));
            Ok(())
        }
        CallOutcome::GaveUp { attempts } => {
            bail!("No successful answer after {} attempts", attempts)
        }
    }
}
