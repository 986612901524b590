//! Insights command

use super::build_service;
use crate::app::OutputFormat;
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(config: Config, format: OutputFormat) -> Result<()> {
    let service = build_service(&config)?;
    let insights = service.insights();
    let stats = service.memory().memory_stats();

    match format {
        OutputFormat::Json => println!(
            "{}",
            json::to_pretty(&serde_json::json!({
                "insights": insights,
                "memory": stats,
            }))
        ),
        OutputFormat::Cli => print!("{}", terminal::format_insights(&insights, Some(&stats))),
    }
    Ok(())
}
