use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use verdict::cli::Cli;
use verdict::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(verdict::LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration resolved");

    verdict::run(cli, &config)
}
