//! Clap derive structures for the `homedeck` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homedeck -- admin gateway and webhook relay for a home-automation dashboard
#[derive(Debug, Parser)]
#[command(
    name = "homedeck",
    version,
    about = "Home-automation admin gateway and webhook relay",
    long_about = "Serves the privileged device-admin endpoint and the outbound webhook relay \
        for a home-automation dashboard.\n\n\
        The data service URL and service-role key come from the config file, \
        HOMEDECK_* variables, or SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HOMEDECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Toml,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    Yaml,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Deliver one webhook synchronously and print the destination's answer
    Relay(RelayArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides `server.bind`)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Destination URL
    #[arg(long, short = 'u')]
    pub url: String,

    /// Inline JSON payload
    #[arg(long, short = 'p', conflicts_with = "payload_file")]
    pub payload: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, short = 'f')]
    pub payload_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration with secrets masked
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
