//! The persisted CLI session.

pub mod storage;

use anyhow::{Context, Result};
use tracing::debug;

use rinnai_cloud::{Client, DeviceApi, UserApi};

use crate::cli::ClientArgs;
use storage::StoredSession;

const NO_SESSION: &str = "No active session. Run 'rinnai account login' first.";

/// Build a client from the stored session.
pub async fn resume(args: &ClientArgs) -> Result<Client> {
    let stored = storage::load_session()
        .context("Failed to load session")?
        .context(NO_SESSION)?;

    let client = Client::builder()
        .config(args.config()?)
        .build()
        .context("Failed to create client")?;
    client
        .restore(&stored.identity, stored.tokens(), stored.refresh_token())
        .await;
    debug!(identity = %stored.identity, "Resumed stored session");

    Ok(client)
}

/// Persist the client's current tokens so renewals survive the process.
pub async fn save(client: &Client) -> Result<()> {
    let creds = client.credentials().await;
    let stored = StoredSession::from_credentials(&creds).context(NO_SESSION)?;
    storage::save_session(&stored).context("Failed to save session")?;
    debug!(expires_at = ?stored.expires_at, "Saved session");
    Ok(())
}

pub fn device_api(client: &Client) -> Result<&DeviceApi> {
    client.device().context(NO_SESSION)
}

pub fn user_api(client: &Client) -> Result<&UserApi> {
    client.user().context(NO_SESSION)
}
