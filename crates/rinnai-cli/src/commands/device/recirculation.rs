//! Recirculation command implementations.

use anyhow::Result;
use clap::Args;

use rinnai_core::types::validate_duration;

use super::ThingArgs;
use crate::cli::ClientArgs;

#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub thing: ThingArgs,

    /// Minutes to recirculate (1 to 60)
    #[arg(long, short, default_value_t = 15, allow_negative_numbers = true)]
    pub minutes: i64,
}

pub async fn start(args: StartArgs, client_args: &ClientArgs) -> Result<()> {
    let device = args.thing.device()?;
    let minutes = validate_duration(args.minutes)?;

    let accepted = format!("Recirculation started for {minutes} minutes");
    super::send(client_args, &accepted, |api| async move {
        api.start_recirculation(&device, args.minutes).await
    })
    .await
}

pub async fn stop(args: ThingArgs, client_args: &ClientArgs) -> Result<()> {
    let device = args.device()?;

    super::send(client_args, "Recirculation stopped", |api| async move {
        api.stop_recirculation(&device).await
    })
    .await
}
