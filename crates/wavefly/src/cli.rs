//! Clap derive structures for the `wavefly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wavefly -- manage Wavefront alerts, events and sources
#[derive(Debug, Parser)]
#[command(
    name = "wavefly",
    version,
    about = "Manage Wavefront alerts, events and sources from the command line",
    long_about = "Idempotent operations against the Wavefront v2 API.\n\n\
        Each command prints a result object with a `changed` flag, the\n\
        affected resource, and any warnings raised along the way.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "WAVEFLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Wavefront cluster URL (overrides profile)
    #[arg(long, short = 'e', env = "WAVEFRONT_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// API token (overrides profile)
    #[arg(long, env = "WAVEFRONT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Config file location
    #[arg(long, env = "WAVEFLY_CONFIG", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: `defaults.output` from the config, else json]
    #[arg(long, short = 'o', env = "WAVEFLY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

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

    /// Accept any TLS certificate
    #[arg(long, short = 'k', env = "WAVEFLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WAVEFLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Field/value table
    Table,
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
    /// Read an alert
    Alert(AlertArgs),

    /// Create, read, search, update or delete an event
    #[command(alias = "ev")]
    Event(EventArgs),

    /// Create or update a source
    #[command(alias = "src")]
    Source(SourceArgs),

    /// Reconcile a source's tags
    #[command(alias = "tags")]
    SourceTags(SourceTagsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Alert ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertArgs {
    /// Alert ID
    pub alert_id: String,
}

// ── Event ────────────────────────────────────────────────────────────

/// The action follows from the inputs: `--id` with a body updates,
/// `--id --delete` deletes, `--id` alone reads, `--query` searches and a
/// body alone creates.
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event ID (`<start-millis>:<name>`)
    #[arg(long)]
    pub id: Option<String>,

    /// Event payload as a JSON object
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the event payload from a JSON file
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,

    /// Search filters as JSON (`[{"key":..,"value":..,"matchingMethod":..}]`)
    #[arg(long, conflicts_with = "query_file")]
    pub query: Option<String>,

    /// Read search filters from a JSON file
    #[arg(long, value_name = "PATH")]
    pub query_file: Option<PathBuf>,

    /// Delete the event given by --id
    #[arg(long, requires = "id")]
    pub delete: bool,

    /// Max search results
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: u32,

    /// Window start in epoch milliseconds (default: one hour ago)
    #[arg(long, value_name = "MILLIS", allow_hyphen_values = true)]
    pub start_time: Option<String>,

    /// Window end in epoch milliseconds (default: now)
    #[arg(long, value_name = "MILLIS", allow_hyphen_values = true)]
    pub end_time: Option<String>,

    /// Annotation to merge into the payload (repeatable)
    #[arg(long = "annotation", short = 'a', value_name = "KEY=VALUE")]
    pub annotations: Vec<String>,

    /// Attempts for create, update and delete (overrides profile)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: Option<u32>,
}

// ── Source ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Source name
    pub name: String,

    /// Tag to set (repeatable)
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,

    /// Source description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Hide the source (existing sources only)
    #[arg(long)]
    pub hidden: bool,
}

// ── Source tags ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TagStateArg {
    /// Add missing tags
    Present,
    /// Remove listed tags
    Absent,
    /// Make the tag set exactly the listed tags
    Replace,
}

#[derive(Debug, Args)]
pub struct SourceTagsArgs {
    /// Source name
    pub source: String,

    /// Desired state; omit to print the current tags
    #[arg(long, short = 's')]
    pub state: Option<TagStateArg>,

    /// Tag to reconcile (repeatable)
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (endpoint, token, token_env, ca_cert, insecure, timeout, event_attempts)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's API token in the system keyring
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
