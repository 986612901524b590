//! Compare command

use super::{build_service, join_words};
use crate::app::{CompareArgs, OutputFormat};
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(args: CompareArgs, config: Config, format: OutputFormat) -> Result<()> {
    let prompt = join_words(&args.prompt);
    let service = build_service(&config)?;
    let results = service.compare_providers(&prompt, &args.providers).await?;

    match format {
        OutputFormat::Json => println!("{}", json::to_pretty(&results)),
        OutputFormat::Cli => print!("{}", terminal::format_comparison(&results)),
    }
    Ok(())
}
