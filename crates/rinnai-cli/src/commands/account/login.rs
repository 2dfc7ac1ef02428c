//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rinnai_cloud::Client;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long, env = "RINNAI_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(long, env = "RINNAI_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client_args: &ClientArgs) -> Result<()> {
    let client = Client::builder()
        .config(client_args.config()?)
        .build()
        .context("Failed to create client")?;

    eprintln!("{}", "Logging in...".dimmed());

    client
        .login(&args.email, &args.password)
        .await
        .context("Failed to login")?;

    session::save(&client).await?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);

    Ok(())
}
