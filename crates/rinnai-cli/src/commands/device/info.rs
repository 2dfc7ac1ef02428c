//! Device info command implementation.

use anyhow::{Result, ensure};
use clap::Args;

use crate::cli::ClientArgs;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Device id as listed by 'rinnai account info'
    pub device_id: String,
}

pub async fn run(args: InfoArgs, client_args: &ClientArgs) -> Result<()> {
    ensure!(!args.device_id.trim().is_empty(), "Device id must not be empty");

    super::send(client_args, "Device not found", |api| async move {
        api.get_info(&args.device_id).await
    })
    .await
}
