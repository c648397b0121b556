//! linklens - terminal client for the URL analyzer service
//!
#![doc = "Main entry point for the linklens CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linklens::cli::Cli;
use linklens::commands::{self, Context};
use linklens::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let ctx = Context::new(config, cli.json)?;
    if !commands::run(ctx, cli.command).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so that stdout carries only command output.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "linklens=debug"
    } else {
        "linklens=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
