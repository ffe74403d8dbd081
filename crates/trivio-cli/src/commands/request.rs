//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use trivio::{Method, RequestOptions};

use crate::cli::SessionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, ...)
    pub method: String,

    /// Path below the API URL (e.g., /posts/)
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Send without logging in or attaching a token
    #[arg(long)]
    pub no_auth: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

pub async fn run(args: RequestArgs) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;
    let body = args
        .data
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--data is not valid JSON")?;
    let options = if args.no_auth {
        RequestOptions::no_auth()
    } else {
        RequestOptions::default()
    };

    let session = args.session.session()?;
    let response = session
        .request(method, &args.path, body.as_ref(), &options)
        .await
        .context("Request failed")?;

    output::field("Status", response.status().as_str());
    match response.json::<serde_json::Value>() {
        Ok(value) => output::json_pretty(&value)?,
        Err(_) => println!("{}", response.text()),
    }

    Ok(())
}
