//! Clap derive structures for the `rtkey` CLI.
//!
//! Kept free of workspace crates so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rtkey -- open and watch Rostelecom Key intercoms and gates
#[derive(Debug, Parser)]
#[command(
    name = "rtkey",
    version,
    about = "Open and monitor Rostelecom Key intercoms and gates",
    long_about = "List the intercoms and gates on a Rostelecom Key account, \
        open them, and follow who opened them last.\n\n\
        The bearer token is taken from --token, the variable named by \
        `token_env` in the config file, RTKEY_TOKEN, the system keyring, \
        or the config file, in that order.",
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
    /// Bearer token (overrides every other source)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Minutes between refreshes for `watch` and `login` (1-1440)
    #[arg(long, global = true)]
    pub interval: Option<u32>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RTKEY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one line per item (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List intercoms and gates on the account
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// Show the last opening of every device
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Open an intercom door or a gate
    Open(OpenArgs),

    /// Refresh periodically and print status changes until Ctrl-C
    Watch,

    /// Validate a bearer token and store it
    Login(LoginArgs),

    /// Inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Only show this device
    pub device_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Device to open (see `rtkey devices`)
    pub device_id: String,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Keep the token in the config file instead of the system keyring
    #[arg(long)]
    pub plaintext: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (token masked)
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
