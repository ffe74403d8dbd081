//! Subcommand implementations.

mod email;
mod fetch;
mod login;
mod request;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// GET a URL with retries and exponential backoff
    Fetch(fetch::FetchArgs),

    /// Log in and report whether the identity is accepted
    Login(login::LoginArgs),

    /// Issue a request through a token session
    Request(request::RequestArgs),

    /// Check whether an email address is deliverable
    VerifyEmail(email::VerifyEmailArgs),

    /// Look up profile data for an email address
    EnrichEmail(email::EnrichEmailArgs),
}

pub async fn handle(cmd: Command) -> Result<()> {
    match cmd {
        Command::Fetch(args) => fetch::run(args).await,
        Command::Login(args) => login::run(args).await,
        Command::Request(args) => request::run(args).await,
        Command::VerifyEmail(args) => email::verify(args).await,
        Command::EnrichEmail(args) => email::enrich(args).await,
    }
}
