//! crowdpad server binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crowdpad_server::config::Config;
use crowdpad_server::server;

#[derive(Parser)]
#[clap(name = "crowdpad")]
#[clap(about = "Let a crowd of browsers share one emulator controller")]
struct Cli {
    /// Config file (skips the usual lookup)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory searched first for config.toml, created if needed
    #[clap(short, long, default_value = "instance")]
    instance_dir: PathBuf,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging comes up before the config is read so lookup is visible;
    // the config's level applies when RUST_LOG is unset.
    let (config, path) = {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_env_filter(filter(cli.debug, "info"))
                .finish(),
        );
        Config::load(cli.config.as_deref(), &cli.instance_dir).context("loading configuration")?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter(cli.debug, &config.logging.level))
        .with_target(false)
        .init();

    tracing::info!(config = %path.display(), "using configuration");

    server::run(config).await
}

fn filter(debug: bool, level: &str) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
