//! Ask command

use super::{build_service, join_words};
use crate::app::{AskArgs, OutputFormat};
use crate::output::{self, json, terminal};
use anyhow::Result;
use logroute_core::{Config, ElasticsearchBackend, LogAssistant};
use std::sync::Arc;

pub(crate) fn build_assistant(config: &Config) -> Result<LogAssistant> {
    let service = build_service(config)?;
    let backend = Arc::new(ElasticsearchBackend::new(config.search.clone())?);
    Ok(LogAssistant::new(
        service,
        backend,
        config.planner.clone(),
        &config.search,
    ))
}

pub async fn run(args: AskArgs, config: Config, format: OutputFormat) -> Result<()> {
    let question = join_words(&args.question);
    let assistant = build_assistant(&config)?;

    match assistant.ask(&question).await {
        Ok(response) => {
            match format {
                OutputFormat::Json => println!("{}", json::to_pretty(&response)),
                OutputFormat::Cli => print!("{}", terminal::format_ask(&response)),
            }
            Ok(())
        }
        Err(failure) => output::exit_with_failure(&failure, format),
    }
}
