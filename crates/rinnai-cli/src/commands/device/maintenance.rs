//! Maintenance retrieval command implementation.

use anyhow::Result;

use super::ThingArgs;
use crate::cli::ClientArgs;

pub async fn run(args: ThingArgs, client_args: &ClientArgs) -> Result<()> {
    let device = args.device()?;

    super::send(client_args, "Maintenance retrieval requested", |api| async move {
        api.do_maintenance_retrieval(&device).await
    })
    .await
}
