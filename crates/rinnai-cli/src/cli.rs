//! CLI argument definitions.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use rinnai_core::config::{
    DEFAULT_GRAPHQL_URL, DEFAULT_SHADOW_BASE_URL, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_MULTIPLIER,
};
use rinnai_core::{ClientConfig, Endpoints, IdentityPool, RetryPolicy};

use crate::commands::account::AccountCommand;
use crate::commands::device::DeviceCommand;

/// Control Rinnai Control-R water heaters through the cloud API.
#[derive(Parser, Debug)]
#[command(name = "rinnai")]
#[command(author, version = env!("RINNAI_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account and session operations
    Account(AccountCommand),

    /// Water heater operations
    Device(DeviceCommand),
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// GraphQL API URL
    #[arg(long, env = "RINNAI_GRAPHQL_URL", default_value = DEFAULT_GRAPHQL_URL, global = true)]
    pub graphql_url: String,

    /// Device shadow API base URL
    #[arg(long, env = "RINNAI_SHADOW_URL", default_value = DEFAULT_SHADOW_BASE_URL, global = true)]
    pub shadow_url: String,

    /// Override the identity provider endpoint
    #[arg(long, env = "RINNAI_COGNITO_ENDPOINT", global = true)]
    pub cognito_endpoint: Option<String>,

    /// Attempts per request
    #[arg(long, env = "RINNAI_RETRY_COUNT", default_value_t = DEFAULT_RETRY_COUNT, global = true)]
    pub retry_count: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, env = "RINNAI_RETRY_DELAY_MS", default_value_t = 1000, global = true)]
    pub retry_delay_ms: u64,

    /// Multiplier applied to the delay after every retry
    #[arg(long, env = "RINNAI_RETRY_MULTIPLIER", default_value_t = DEFAULT_RETRY_MULTIPLIER, global = true)]
    pub retry_multiplier: f64,

    /// Timeout of a single request attempt, in seconds
    #[arg(long, env = "RINNAI_REQUEST_TIMEOUT", default_value_t = 30, global = true)]
    pub request_timeout: u64,

    /// Timeout of a single identity provider call, in seconds
    #[arg(long, env = "RINNAI_EXECUTOR_TIMEOUT", default_value_t = 30, global = true)]
    pub executor_timeout: u64,
}

impl ClientArgs {
    /// Build the client configuration these flags describe.
    pub fn config(&self) -> Result<ClientConfig> {
        let retry = RetryPolicy::new(
            self.retry_count,
            Duration::from_millis(self.retry_delay_ms),
            self.retry_multiplier,
        )
        .context("Invalid retry settings")?;

        let config = ClientConfig::default()
            .with_retry(retry)
            .with_request_timeout(Duration::from_secs(self.request_timeout))
            .with_executor_timeout(Duration::from_secs(self.executor_timeout))
            .with_identity_pool(IdentityPool {
                endpoint: self.cognito_endpoint.clone(),
                ..IdentityPool::default()
            })
            .with_endpoints(Endpoints {
                graphql: self.graphql_url.clone(),
                shadow_base: self.shadow_url.clone(),
            });
        config.validate().context("Invalid client configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_reach_the_config() {
        let cli = Cli::parse_from([
            "rinnai",
            "--retry-count",
            "5",
            "--retry-delay-ms",
            "250",
            "--cognito-endpoint",
            "http://127.0.0.1:9000/",
            "account",
            "whoami",
        ]);

        let config = cli.client.config().unwrap();
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.initial_delay(), Duration::from_millis(250));
        assert_eq!(
            config.identity_pool.endpoint_url(),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let cli = Cli::parse_from(["rinnai", "--retry-count", "0", "account", "whoami"]);
        assert!(cli.client.config().is_err());
    }
}
