//! Email verification and enrichment commands.

use anyhow::{Context, Result};
use clap::Args;

use trivio::RetryingRequester;
use trivio::external::{CLEARBIT_ENRICHMENT_URL, EmailEnricher, EmailVerifier, HUNTER_VERIFIER_URL};

use crate::output;

#[derive(Args, Debug)]
pub struct VerifyEmailArgs {
    /// Address to check
    pub email: String,

    /// hunter.io API key; without it every well-formed address passes
    #[arg(long, env = "EMAIL_HUNTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Verifier endpoint
    #[arg(long, default_value = HUNTER_VERIFIER_URL)]
    pub endpoint: String,
}

#[derive(Args, Debug)]
pub struct EnrichEmailArgs {
    /// Address to look up
    pub email: String,

    /// clearbit API key; without it the result is always empty
    #[arg(long, env = "CLEARBIT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enrichment endpoint
    #[arg(long, default_value = CLEARBIT_ENRICHMENT_URL)]
    pub endpoint: String,
}

pub async fn verify(args: VerifyEmailArgs) -> Result<()> {
    let requester = RetryingRequester::new().context("Failed to create HTTP client")?;
    let verifier = EmailVerifier::new(requester, args.api_key).with_endpoint(args.endpoint);

    let verified = verifier
        .verify(&args.email)
        .await
        .context("Verification failed")?;

    if verified {
        output::success(&format!("{} looks deliverable", args.email));
    } else {
        output::warning(&format!("{} could not be verified", args.email));
    }

    Ok(())
}

pub async fn enrich(args: EnrichEmailArgs) -> Result<()> {
    let requester = RetryingRequester::new().context("Failed to create HTTP client")?;
    let enricher = EmailEnricher::new(requester, args.api_key).with_endpoint(args.endpoint);

    let profile = enricher
        .enrich(&args.email)
        .await
        .context("Enrichment failed")?;

    output::json_pretty(&profile)
}
