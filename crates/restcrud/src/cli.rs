//! Clap derive structures for the `restcrud` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// restcrud -- typed CRUD client for REST-ish JSON backends
#[derive(Debug, Parser)]
#[command(
    name = "restcrud",
    version,
    about = "Create, read, update and delete records on REST-ish JSON backends",
    long_about = "A CLI for working with a REST-ish JSON backend's item collection.\n\n\
        Backends are described by profiles (built from presets such as\n\
        jsonplaceholder, laravel or express) and every failure is reported\n\
        as one classified error with a matching exit code.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "RESTCRUD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "RESTCRUD_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "RESTCRUD_BASE_URL", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Logical resource name, e.g. posts (overrides profile)
    #[arg(long, short = 'r', env = "RESTCRUD_RESOURCE", global = true)]
    pub resource: Option<String>,

    /// Bearer token
    #[arg(long, env = "RESTCRUD_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Request timeout in milliseconds (overrides profile)
    #[arg(long, env = "RESTCRUD_TIMEOUT", global = true, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RESTCRUD_OUTPUT",
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

    /// Bypass the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,
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
    /// Manage items on the configured backend
    #[command(alias = "i")]
    Items(ItemsArgs),

    /// Check item fields against the form rules, offline
    Validate(ItemFormArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ITEMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// List all items
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get one item
    Get {
        /// Item ID
        id: String,
    },

    /// Create an item
    Create(ItemFormArgs),

    /// Replace an item
    Update {
        /// Item ID
        id: String,

        #[command(flatten)]
        fields: ItemFormArgs,
    },

    /// Change some fields of an item
    Patch {
        /// Item ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        body: Option<String>,

        /// New owner
        #[arg(long)]
        user_id: Option<i64>,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID
        id: String,
    },

    /// Ask the backend to search items (`?q=QUERY`)
    Search {
        /// Search text
        query: String,
    },
}

/// Local filtering and sorting for `items list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Keep items whose title or body contains this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Sort by a field (title, body, id, userId)
    #[arg(long, short = 's', value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Truncate long descriptions in table output to this many characters
    #[arg(long, default_value = "60", value_name = "CHARS")]
    pub width: usize,
}

/// Item fields for create, update and validate.
#[derive(Debug, Args)]
pub struct ItemFormArgs {
    /// Item title
    #[arg(long)]
    pub title: Option<String>,

    /// Item description
    #[arg(long)]
    pub body: Option<String>,

    /// Owner user ID
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Read the item from a JSON file instead
    #[arg(long, short = 'F', value_name = "PATH", conflicts_with_all = ["title", "body", "user_id"])]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current configuration (tokens masked)
    Show,

    /// Create a profile from a preset
    Init {
        /// Preset to start from (see `config presets`)
        #[arg(long)]
        preset: Option<String>,

        /// Overwrite an existing profile of the same name
        #[arg(long)]
        force: bool,
    },

    /// List built-in backend presets
    Presets,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken,

    /// Remove the bearer token from the system keyring
    ClearToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
