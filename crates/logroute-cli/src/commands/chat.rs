//! Interactive chat command
//!
//! Lines starting with `/` are session commands; everything else is a
//! question. Memory persists for the lifetime of the session.

use super::ask::build_assistant;
use crate::app::{ChatArgs, OutputFormat};
use crate::output::{json, terminal};
use anyhow::Result;
use logroute_core::{Config, LogAssistant, ProviderKind, RouterService};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands:
  /reset              clear conversation memory
  /stats              provider statistics
  /insights           learned error and service patterns
  /memory             recent conversation and memory usage
  /provider <name>    prefer a provider (openai, claude, gemini, auto)
  /quit               leave the session
";

enum Flow {
    Continue,
    Quit,
}

struct Session {
    assistant: LogAssistant,
    service: Arc<RouterService>,
    provider: Option<ProviderKind>,
    direct: bool,
    format: OutputFormat,
}

impl Session {
    fn handle_command(&mut self, line: &str) -> Flow {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();

        match command {
            "quit" | "exit" | "q" => return Flow::Quit,
            "reset" => {
                let confirmation = self.service.reset_session();
                self.emit(&confirmation, || format!("{}\n", confirmation.message));
            }
            "stats" => {
                let report = self.service.get_stats();
                self.emit(&report, || terminal::format_stats(&report));
            }
            "insights" => {
                let insights = self.service.insights();
                self.emit(&insights, || terminal::format_insights(&insights, None));
            }
            "memory" => {
                let memory = self.service.memory();
                let summary = memory.conversation_summary(5);
                let stats = memory.memory_stats();
                let value = serde_json::json!({ "recent": summary, "stats": stats });
                self.emit(&value, || {
                    let mut out = String::new();
                    for item in &summary {
                        out.push_str(&format!("  [{}] {}\n", item.query_type, item.query));
                    }
                    out.push_str(&format!(
                        "{} turns, {} queries, {} error patterns, {} services\n",
                        stats.conversation_turns,
                        stats.query_context_items,
                        stats.learned_error_patterns,
                        stats.tracked_services
                    ));
                    out
                });
            }
            "provider" => match parts.next() {
                Some("auto") => {
                    self.provider = None;
                    self.service.set_session_override(None);
                    println!("Provider selection: automatic");
                }
                Some(name) => match name.parse::<ProviderKind>() {
                    Ok(kind) => {
                        self.provider = Some(kind);
                        self.service.set_session_override(Some(vec![kind]));
                        println!("Provider selection: {}", kind);
                    }
                    Err(e) => eprintln!("{}", e),
                },
                None => {
                    let current = self
                        .provider
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "auto".to_string());
                    println!("Provider selection: {}", current);
                }
            },
            _ => print!("{}", HELP),
        }
        Flow::Continue
    }

    fn emit<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        match self.format {
            OutputFormat::Json => println!("{}", json::to_pretty(value)),
            OutputFormat::Cli => print!("{}", text()),
        }
    }

    async fn handle_question(&self, line: &str) {
        if self.direct {
            match self.service.route_request(line, self.provider).await {
                Ok(response) => self.emit(&response, || terminal::format_route(&response)),
                Err(failure) => self.report_failure(&failure),
            }
        } else {
            match self.assistant.ask_with_provider(line, self.provider).await {
                Ok(response) => self.emit(&response, || terminal::format_ask(&response)),
                Err(failure) => self.report_failure(&failure),
            }
        }
    }

    fn report_failure(&self, failure: &logroute_core::RequestFailure) {
        match self.format {
            OutputFormat::Json => println!("{}", json::to_pretty(failure)),
            OutputFormat::Cli => eprint!("{}", terminal::format_failure(failure)),
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(args: ChatArgs, config: Config, format: OutputFormat) -> Result<()> {
    let assistant = build_assistant(&config)?;
    let service = Arc::clone(assistant.service());
    if let Some(kind) = args.provider {
        service.set_session_override(Some(vec![kind]));
    }

    let mut session = Session {
        assistant,
        service,
        provider: args.provider,
        direct: args.direct,
        format,
    };

    println!("logroute chat, /help for commands");
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            if let Some(command) = line.strip_prefix('/') {
                if let Flow::Quit = session.handle_command(command) {
                    break;
                }
            } else {
                session.handle_question(line).await;
            }
        }
        prompt();
    }

    Ok(())
}
