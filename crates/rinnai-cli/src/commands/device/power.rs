//! Turn on and turn off command implementation.

use anyhow::Result;

use super::ThingArgs;
use crate::cli::ClientArgs;

pub async fn run(args: ThingArgs, client_args: &ClientArgs, on: bool) -> Result<()> {
    let device = args.device()?;

    let accepted = if on { "Water heater turned on" } else { "Water heater turned off" };
    super::send(client_args, accepted, |api| async move {
        if on {
            api.turn_on(&device).await
        } else {
            api.turn_off(&device).await
        }
    })
    .await
}
