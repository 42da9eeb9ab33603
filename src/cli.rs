//! Command-line interface parsing for the emission aggregator
//!
//! This module handles parsing of CLI arguments using clap. Every option can
//! also be supplied through the environment, which is how the service is
//! normally configured when deployed.

use std::net::IpAddr;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{ApiConfig, BackoffConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS};
use crate::source::footprint::DEFAULT_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A zero base delay would retry rate-limited requests without pausing
    #[error("Invalid base delay: must be greater than 0ms")]
    ZeroBaseDelay,
}

/// Aggregate per-country carbon emissions from the Global Footprint Network
#[derive(Parser, Debug)]
#[command(name = "emission-aggregator")]
#[command(about = "Aggregate per-country carbon emissions by year")]
#[command(version)]
pub struct Cli {
    /// Initial delay before retrying a rate-limited request, in milliseconds
    #[arg(long, env = "REQ_DELAY", default_value_t = DEFAULT_BASE_DELAY_MS, global = true)]
    pub base_delay_ms: u64,

    /// Retry delay ceiling in milliseconds; hitting it aborts the pass
    #[arg(long, env = "MAX_REQ_DELAY", default_value_t = DEFAULT_MAX_DELAY_MS, global = true)]
    pub max_delay_ms: u64,

    /// Base URL of the footprint API
    #[arg(long, env = "FOOTPRINT_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// API key sent as the basic-auth password
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to run
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the aggregate over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: IpAddr,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
    },
    /// Run one aggregation pass and print the result as JSON
    Aggregate {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub backoff: BackoffConfig,
    pub api: ApiConfig,
    pub command: Command,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if a delay setting is unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.base_delay_ms == 0 {
            return Err(CliError::ZeroBaseDelay);
        }

        Ok(StartupConfig {
            backoff: BackoffConfig::from_millis(cli.base_delay_ms, cli.max_delay_ms),
            api: ApiConfig {
                base_url: cli.api_url.clone(),
                api_key: cli.api_key.clone().filter(|key| !key.is_empty()),
            },
            command: cli.command.clone(),
        })
    }
}
