//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::SessionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let session = args.session.session()?;

    eprintln!("{}", "Logging in...".dimmed());

    session.login().await.context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &args.session.username);
    output::field("API", session.config().base_url.as_str());

    Ok(())
}
