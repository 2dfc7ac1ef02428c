//! Account info command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct InfoArgs {}

pub async fn run(_args: InfoArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::resume(client_args).await?;

    let response = session::user_api(&client)?
        .get_info()
        .await
        .context("Failed to fetch account info")?;

    session::save(&client).await?;

    if response.success && response.data.is_none() {
        output::success("No account profile found");
        return Ok(());
    }
    output::api_response(&response, "Account info fetched")
}
