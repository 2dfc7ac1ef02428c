//! Set temperature command implementation.

use anyhow::Result;
use clap::Args;

use rinnai_core::TemperatureUnit;
use rinnai_core::types::validate_temperature;

use crate::cli::ClientArgs;

#[derive(Args, Debug)]
pub struct SetTemperatureArgs {
    /// Device thing name
    pub thing_name: String,

    /// Target temperature
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Unit of the target temperature (fahrenheit or celsius)
    #[arg(long, short, default_value_t = TemperatureUnit::Fahrenheit)]
    pub unit: TemperatureUnit,
}

pub async fn run(args: SetTemperatureArgs, client_args: &ClientArgs) -> Result<()> {
    let device = super::ThingArgs {
        thing_name: args.thing_name,
    }
    .device()?;
    let fahrenheit = validate_temperature(args.value, args.unit)?;

    let accepted = format!("Temperature set to {fahrenheit}°F");
    super::send(client_args, &accepted, |api| async move {
        api.set_temperature(&device, args.value, args.unit).await
    })
    .await
}
