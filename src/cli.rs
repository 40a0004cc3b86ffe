//! CLI argument parsing via clap.

use clap::Parser;
use parley::build_info;

/// A function-calling assistant for the terminal. Works with any
/// OpenAI-compatible completions API.
#[derive(Debug, Parser)]
#[command(name = "parley", version, after_help = build_info::HELP_BUILD_METADATA)]
pub struct Args {
    /// Prompt to send. If provided, runs in one-shot mode and exits.
    pub prompt: Option<String>,

    /// Path to config file (default: ./parley.toml or
    /// ~/.config/parley/parley.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
