//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "qaforge",
    bin_name = "qaforge",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate ready-to-run test automation projects",
    long_about = "qaforge turns a JSON description of a test automation project \
                  (tool, language, runner, build tool, scenarios, CI/CD) into a \
                  zip archive rendered from a template pack.",
    after_help = "EXAMPLES:\n\
        \x20 qaforge generate project.json -o my-tests.zip\n\
        \x20 qaforge list\n\
        \x20 qaforge packs selenium-java-junit5\n\
        \x20 qaforge completions bash > /usr/share/bash-completion/completions/qaforge",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a project from a configuration file.
    #[command(
        visible_alias = "gen",
        about = "Generate a project and wait for it to finish",
        after_help = "EXAMPLES:\n\
            \x20 qaforge generate project.json\n\
            \x20 qaforge generate project.json -o tests.zip --force\n\
            \x20 cat project.json | qaforge generate - --no-progress"
    )]
    Generate(GenerateArgs),

    /// Show one project's status.
    #[command(about = "Show a project's status and progress")]
    Status(ProjectArgs),

    /// List the files of a completed project.
    #[command(about = "List a project's files")]
    Files(ProjectArgs),

    /// Copy a completed project's archive to disk.
    #[command(
        about = "Save a project's archive",
        after_help = "EXAMPLES:\n\
            \x20 qaforge download 3f0c... -o tests.zip"
    )]
    Download(DownloadArgs),

    /// Delete a project and its files.
    #[command(visible_alias = "rm", about = "Delete a project")]
    Delete(ProjectArgs),

    /// List live projects.
    #[command(visible_alias = "ls", about = "List live projects")]
    List(ListArgs),

    /// Remove expired projects.
    #[command(
        about = "Remove expired projects",
        after_help = "EXAMPLES:\n\
            \x20 qaforge sweep\n\
            \x20 qaforge sweep --recover   # also fail records left by a crashed run"
    )]
    Sweep(SweepArgs),

    /// Show installed template packs.
    #[command(
        about = "List template packs or inspect one",
        after_help = "EXAMPLES:\n\
            \x20 qaforge packs\n\
            \x20 qaforge packs playwright-typescript"
    )]
    Packs(PacksArgs),

    /// Initialise a qaforge configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 qaforge init           # default location\n\
            \x20 qaforge init --local   # ./qaforge.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 qaforge completions bash > ~/.local/share/bash-completion/completions/qaforge\n\
            \x20 qaforge completions zsh  > ~/.zfunc/_qaforge\n\
            \x20 qaforge completions fish > ~/.config/fish/completions/qaforge.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the qaforge configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 qaforge config get engine.ttl_hours\n\
            \x20 qaforge config list\n\
            \x20 qaforge config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `qaforge generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// JSON configuration file, or `-` for stdin.
    #[arg(value_name = "CONFIG", help = "Project configuration (JSON file or '-')")]
    pub config: PathBuf,

    /// Where to copy the finished archive.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Copy the archive to FILE when done"
    )]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists.
    #[arg(short = 'f', long = "force", requires = "output", help = "Overwrite FILE")]
    pub force: bool,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress", help = "Disable the progress bar")]
    pub no_progress: bool,
}

// ── project id commands ───────────────────────────────────────────────────────

/// A single project id.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project id as printed by `generate` or `list`.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for `qaforge download`.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    /// Destination file.
    #[arg(short = 'o', long = "output", value_name = "FILE", help = "Destination file")]
    pub output: PathBuf,

    /// Overwrite the destination if it exists.
    #[arg(short = 'f', long = "force", help = "Overwrite existing file")]
    pub force: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `qaforge list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show projects in this state.
    #[arg(short = 's', long = "status", value_enum, help = "Filter by status")]
    pub status: Option<StatusFilter>,
}

/// Project states accepted by `list --status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Pending,
    Generating,
    Completed,
    Failed,
}

// ── sweep ─────────────────────────────────────────────────────────────────────

/// Arguments for `qaforge sweep`.
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Also mark records left pending or generating by a crashed run as failed.
    #[arg(long = "recover", help = "Fail generations interrupted by a crash")]
    pub recover: bool,
}

// ── packs ─────────────────────────────────────────────────────────────────────

/// Arguments for `qaforge packs`.
#[derive(Debug, Args)]
pub struct PacksArgs {
    /// Pack to inspect; lists all packs when omitted.
    #[arg(value_name = "PACK")]
    pub id: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `qaforge init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write `qaforge.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `qaforge completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `qaforge config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `engine.packs_dir`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
