//! Test-provider command
//!
//! Settings come from the config file, then the environment, then flags.
//! Nothing here writes to the process environment.

use super::build_service;
use crate::app::{OutputFormat, TestProviderArgs};
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(args: TestProviderArgs, config: Config, format: OutputFormat) -> Result<()> {
    let mut settings = config.providers.get(args.provider).clone();
    if let Some(key) = args.api_key {
        settings.api_key = Some(key);
    }
    if let Some(model) = args.model {
        settings.model = Some(model);
    }
    if let Some(base_url) = args.base_url {
        settings.base_url = Some(base_url);
    }

    let service = build_service(&config)?;
    let health = service.test_provider(args.provider, &settings).await;

    match format {
        OutputFormat::Json => println!("{}", json::to_pretty(&health)),
        OutputFormat::Cli => print!("{}", terminal::format_health(std::slice::from_ref(&health))),
    }
    Ok(())
}
