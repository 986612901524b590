//! Logroute CLI
//!
//! Natural-language log search routed across multiple LLM providers.

use anyhow::Result;
use clap::Parser;
use logroute_core::Config;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // LOGROUTE_CONFIG overrides the default location
    let config = Config::load()?;

    let result = match cli.command {
        Commands::Ask(args) => commands::ask::run(args, config, cli.format).await,
        Commands::Route(args) => commands::route::run(args, config, cli.format).await,
        Commands::Chat(args) => commands::chat::run(args, config, cli.format).await,
        Commands::Stats => commands::stats::run(config, cli.format).await,
        Commands::Health => commands::health::run(config, cli.format).await,
        Commands::Compare(args) => commands::compare::run(args, config, cli.format).await,
        Commands::TestProvider(args) => {
            commands::test_provider::run(args, config, cli.format).await
        }
        Commands::Insights => commands::insights::run(config, cli.format).await,
        Commands::Config(args) => commands::config::run(args, config, cli.format).await,
    };

    result
}
