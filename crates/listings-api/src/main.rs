//! Main entry point for the listings API

use clap::Parser;
use common::journal::init_logging;
use listings_api::{config::Config, server::Server, Error, Result};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "listings-api",
    about = "Estate listings HTTP API",
    version,
    author
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle config generation before anything is logged to stdout
    if args.gen_config {
        let example_config = Config::generate_example()?;
        println!("{example_config}");
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging).map_err(|e| Error::Internal {
        message: format!("Failed to initialize logging: {e}"),
    })?;

    info!("Starting listings API v{}", listings_api::VERSION);
    config.log_warnings();
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    let server = Server::new(config).await?;

    info!("Listings API initialized successfully");

    match server.run().await {
        Ok(()) => {
            info!("Listings API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Listings API error: {}", e);
            Err(e)
        }
    }
}
