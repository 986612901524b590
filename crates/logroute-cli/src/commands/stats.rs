//! Stats command

use super::build_service;
use crate::app::OutputFormat;
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(config: Config, format: OutputFormat) -> Result<()> {
    let service = build_service(&config)?;
    let report = service.get_stats();

    match format {
        OutputFormat::Json => println!("{}", json::to_pretty(&report)),
        OutputFormat::Cli => print!("{}", terminal::format_stats(&report)),
    }
    Ok(())
}
