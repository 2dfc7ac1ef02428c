//! Account subcommand implementations.

mod info;
mod login;
mod logout;
mod refresh_token;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::ClientArgs;

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountSubcommand {
    /// Log in with the account email and password
    Login(login::LoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Renew the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Fetch the account profile and its devices
    Info(info::InfoArgs),
}

pub async fn handle(cmd: AccountCommand, client: &ClientArgs) -> Result<()> {
    match cmd.command {
        AccountSubcommand::Login(args) => login::run(args, client).await,
        AccountSubcommand::Whoami(args) => whoami::run(args),
        AccountSubcommand::RefreshToken(args) => refresh_token::run(args, client).await,
        AccountSubcommand::Logout(args) => logout::run(args),
        AccountSubcommand::Info(args) => info::run(args, client).await,
    }
}
