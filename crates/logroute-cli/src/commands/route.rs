//! Route command

use super::{build_service, join_words};
use crate::app::{OutputFormat, RouteArgs};
use crate::output::{self, json, terminal};
use anyhow::Result;
use logroute_core::Config;

pub async fn run(args: RouteArgs, mut config: Config, format: OutputFormat) -> Result<()> {
    if args.no_fallback {
        config.system.enable_fallback = false;
    }
    let text = join_words(&args.text);
    let service = build_service(&config)?;

    match service.route_request(&text, args.provider).await {
        Ok(response) => {
            match format {
                OutputFormat::Json => println!("{}", json::to_pretty(&response)),
                OutputFormat::Cli => print!("{}", terminal::format_route(&response)),
            }
            Ok(())
        }
        Err(failure) => output::exit_with_failure(&failure, format),
    }
}
