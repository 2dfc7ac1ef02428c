//! Output formatting helpers.

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use rinnai_core::ApiResponse;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the outcome of an API call; a failed call becomes an error.
pub fn api_response(response: &ApiResponse, accepted: &str) -> Result<()> {
    if !response.success {
        bail!(
            "{}",
            response.error.as_deref().unwrap_or("Request failed")
        );
    }

    match &response.data {
        Some(data) => json_pretty(data),
        None => {
            success(accepted);
            Ok(())
        }
    }
}
