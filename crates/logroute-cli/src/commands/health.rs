//! Health command

use super::build_service;
use crate::app::OutputFormat;
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(config: Config, format: OutputFormat) -> Result<()> {
    let service = build_service(&config)?;
    let health = service.check_health().await;

    match format {
        OutputFormat::Json => println!("{}", json::to_pretty(&health)),
        OutputFormat::Cli => print!("{}", terminal::format_health(&health)),
    }
    Ok(())
}
