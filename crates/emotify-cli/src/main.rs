//! emotify entry point
//!
//! Run with:
//! ```bash
//! DISCORD_TOKEN=... cargo run -p emotify-cli -- react --channel <id> -e :thumbsup:
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use clap::Parser;
use emotify_cli::Cli;
use emotify_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Initialize tracing
    let tracing_config = TracingConfig::for_environment(config.app.env, config.app.log_json);
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(env = ?config.app.env, api_base = %config.discord.api_base, "Configuration loaded");

    if let Err(e) = emotify_cli::run(cli, config).await {
        error!(error = %e, "emotify failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
