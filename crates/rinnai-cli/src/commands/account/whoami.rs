//! Whoami command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs) -> Result<()> {
    let session = storage::load_session()
        .context("Failed to load session")?
        .context("No active session. Run 'rinnai account login' first.")?;

    output::field("Email", &session.identity);

    let tokens = session.tokens();
    match tokens.expires_at() {
        Some(expires_at) => {
            output::field("Expires", &expires_at.to_rfc3339());
            let state = if tokens.is_expired_at(Utc::now()) {
                "expired (renewed on next request)"
            } else {
                "valid"
            };
            output::field("Token", state);
        }
        None => output::field("Expires", "unknown"),
    }

    Ok(())
}
