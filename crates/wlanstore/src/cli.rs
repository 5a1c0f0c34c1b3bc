//! Clap derive structures for the `wlanstore` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wlanstore -- inspect and edit a Wi-Fi network profile store
#[derive(Debug, Parser)]
#[command(
    name = "wlanstore",
    version,
    about = "Inspect and edit Wi-Fi network profile stores",
    long_about = "Loads a JSON profile store into the configuration repository,\n\
        runs one operation against it, and writes the result back.",
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
    /// Profile store file (overrides config)
    #[arg(long, short = 's', env = "WLANSTORE_STORE_PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "WLANSTORE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WLANSTORE_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, add, remove, enable and disable network profiles
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Show the lists handed to the background scanner
    Scan(ScanArgs),

    /// Print the repository's diagnostic dump
    Dump,

    /// Show configuration and file locations
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Networks ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List stored profiles with credentials masked
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one profile
    Show {
        /// Network id
        id: i32,

        /// Print credentials in clear
        #[arg(long)]
        reveal: bool,
    },

    /// Add a profile, or update the one with the same SSID and security
    Add(AddArgs),

    /// Remove a profile
    #[command(alias = "rm")]
    Remove {
        /// Network id
        id: i32,
    },

    /// Enable a profile for auto-join
    Enable {
        /// Network id
        id: i32,

        /// Disable every other profile
        #[arg(long)]
        disable_others: bool,
    },

    /// Disable a profile permanently
    Disable {
        /// Network id
        id: i32,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Restrict to one class of profile
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: ListFilter,

    /// Only profiles with this SSID
    #[arg(long)]
    pub ssid: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFilter {
    All,
    Saved,
    Ephemeral,
    Passpoint,
    Disabled,
    Hidden,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Network name, unquoted
    pub ssid: String,

    /// Security type
    #[arg(long, default_value = "psk")]
    pub security: SecurityArg,

    /// Passphrase (PSK/SAE) or key (WEP); prompted for when omitted
    #[arg(long, env = "WLANSTORE_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// The network does not broadcast its SSID
    #[arg(long)]
    pub hidden: bool,

    /// Use the device MAC instead of a per-network randomized one
    #[arg(long)]
    pub no_mac_randomization: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecurityArg {
    Open,
    Wep,
    Psk,
    Sae,
}

// ── Scan lists ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(subcommand)]
    pub command: ScanCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScanCommand {
    /// Ranked preferred-network-offload list
    Pno,
    /// Quoted SSIDs that need a directed probe
    Hidden,
    /// Channels for a partial scan targeting one profile
    Channels {
        /// Network id
        id: i32,

        /// Only frequencies seen within this many milliseconds
        #[arg(long, default_value_t = 3_600_000)]
        age_ms: u64,

        /// Frequency currently in use, always included
        #[arg(long)]
        current_frequency: Option<u32>,
    },
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config and store file locations
    Path,
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
