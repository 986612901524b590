//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use logroute_core::ProviderKind;

#[derive(Parser)]
#[command(name = "logroute")]
#[command(
    author,
    version,
    about = "Ask questions about your logs through multiple LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a question into a log query, run it and summarize
    Ask(AskArgs),

    /// Send free-form text to the routed provider
    Route(RouteArgs),

    /// Interactive session with conversation memory
    Chat(ChatArgs),

    /// Show provider statistics and routing configuration
    Stats,

    /// Probe every configured provider
    Health,

    /// Send one prompt to several providers side by side
    Compare(CompareArgs),

    /// Probe a provider with explicit settings
    TestProvider(TestProviderArgs),

    /// Show learned error and service patterns
    Insights,

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question about your logs
    #[arg(required = true)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Request text
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Use this provider first when available
    #[arg(long, short = 'p')]
    pub provider: Option<ProviderKind>,

    /// Fail instead of trying other providers
    #[arg(long)]
    pub no_fallback: bool,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Start with this provider selected
    #[arg(long, short = 'p')]
    pub provider: Option<ProviderKind>,

    /// Route free-form text instead of running log queries
    #[arg(long)]
    pub direct: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Prompt to send
    #[arg(required = true)]
    pub prompt: Vec<String>,

    /// Providers to compare (default: all available)
    #[arg(long, value_delimiter = ',')]
    pub providers: Vec<ProviderKind>,
}

#[derive(Args)]
pub struct TestProviderArgs {
    /// Provider to probe
    pub provider: ProviderKind,

    /// API key to use instead of the configured one
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model override
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL override
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (credentials masked)
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
