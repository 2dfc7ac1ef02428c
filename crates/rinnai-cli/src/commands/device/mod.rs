//! Device subcommand implementations.
//!
//! Arguments are validated before the session is loaded, so a bad value
//! never costs a request.

mod info;
mod maintenance;
mod power;
mod recirculation;
mod set_temperature;

use std::future::Future;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use rinnai_cloud::DeviceApi;
use rinnai_core::{ApiResponse, DeviceRef};

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct DeviceCommand {
    #[command(subcommand)]
    pub command: DeviceSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DeviceSubcommand {
    /// Fetch a device record by id
    Info(info::InfoArgs),

    /// Set the domestic hot water temperature
    SetTemperature(set_temperature::SetTemperatureArgs),

    /// Start recirculation for a number of minutes
    StartRecirculation(recirculation::StartArgs),

    /// Stop recirculation
    StopRecirculation(ThingArgs),

    /// Turn the water heater on
    TurnOn(ThingArgs),

    /// Turn the water heater off
    TurnOff(ThingArgs),

    /// Request a maintenance data retrieval
    Maintenance(ThingArgs),
}

/// A command addressed to one device.
#[derive(Args, Debug)]
pub struct ThingArgs {
    /// Device thing name (for example rinnai-thing-123)
    pub thing_name: String,
}

impl ThingArgs {
    fn device(&self) -> Result<DeviceRef> {
        DeviceRef::new(&self.thing_name).context("Invalid device")
    }
}

pub async fn handle(cmd: DeviceCommand, client: &ClientArgs) -> Result<()> {
    match cmd.command {
        DeviceSubcommand::Info(args) => info::run(args, client).await,
        DeviceSubcommand::SetTemperature(args) => set_temperature::run(args, client).await,
        DeviceSubcommand::StartRecirculation(args) => recirculation::start(args, client).await,
        DeviceSubcommand::StopRecirculation(args) => recirculation::stop(args, client).await,
        DeviceSubcommand::TurnOn(args) => power::run(args, client, true).await,
        DeviceSubcommand::TurnOff(args) => power::run(args, client, false).await,
        DeviceSubcommand::Maintenance(args) => maintenance::run(args, client).await,
    }
}

/// Resume the session, run one device call, and persist the tokens it may
/// have renewed before reporting the outcome.
async fn send<F, Fut>(client_args: &ClientArgs, accepted: &str, call: F) -> Result<()>
where
    F: FnOnce(DeviceApi) -> Fut,
    Fut: Future<Output = rinnai_core::Result<ApiResponse>>,
{
    let client = session::resume(client_args).await?;
    let api = session::device_api(&client)?.clone();

    let response = call(api).await;
    session::save(&client).await?;
    client.close();

    output::api_response(&response?, accepted)
}
