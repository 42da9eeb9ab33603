//! Emission Aggregator - per-country carbon emissions by year
//!
//! Runs either as an HTTP service exposing the merged aggregate, or as a
//! one-shot command printing it to stdout.

use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use emission_aggregator::cli::{Cli, Command, StartupConfig};
use emission_aggregator::workflow::FAILURE_MESSAGE;
use emission_aggregator::{server, EmissionWorkflow, FootprintClient, ResultCache, TokioDelay};

/// Initializes the tracing subscriber, with JSON output when `LOG_FORMAT=json`
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("emission_aggregator=info"));

    // Logs go to stderr so `aggregate` output stays clean JSON
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    init_tracing();

    let mut client = FootprintClient::new().with_base_url(config.api.base_url.clone());
    if let Some(ref key) = config.api.api_key {
        client = client.with_api_key(key.clone());
    }

    let cache = Arc::new(ResultCache::new());
    let workflow = Arc::new(EmissionWorkflow::new(client, TokioDelay, cache, config.backoff));

    match config.command {
        Command::Serve { bind, port } => {
            let app = server::router(workflow);
            server::serve(app, std::net::SocketAddr::new(bind, port)).await?;
        }
        Command::Aggregate { pretty } => {
            // Cause is already logged by the workflow
            let Ok(response) = workflow.run().await else {
                eprintln!("{}", FAILURE_MESSAGE);
                std::process::exit(1);
            };
            let json = if pretty {
                serde_json::to_string_pretty(response.data.as_ref())?
            } else {
                serde_json::to_string(response.data.as_ref())?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
