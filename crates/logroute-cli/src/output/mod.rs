//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use logroute_core::RequestFailure;

/// Print a failed request and exit with its code
pub fn exit_with_failure(failure: &RequestFailure, format: OutputFormat) -> ! {
    match format {
        OutputFormat::Json => println!("{}", json::to_pretty(failure)),
        OutputFormat::Cli => eprint!("{}", terminal::format_failure(failure)),
    }
    std::process::exit(failure.exit_code)
}
