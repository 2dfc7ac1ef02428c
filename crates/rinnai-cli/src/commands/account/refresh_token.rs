//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::resume(client_args).await?;

    eprintln!("{}", "Refreshing session...".dimmed());

    client
        .renew_access_token()
        .await
        .context("Failed to refresh session")?;

    session::save(&client).await?;

    output::success("Session refreshed successfully");
    if let Some(expires_at) = client
        .credentials()
        .await
        .tokens
        .and_then(|tokens| tokens.expires_at())
    {
        output::field("Expires", &expires_at.to_rfc3339());
    }

    Ok(())
}
