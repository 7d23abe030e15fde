//! CLI argument definitions
//!
//! All Clap derive structs for `pipecfg` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

/// Default configuration file looked up by `show` and `plan`.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

// ============================================================================
// Root CLI
// ============================================================================

/// Validate and inspect ML pipeline configuration documents.
#[derive(Parser, Debug)]
#[command(name = "pipecfg", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "PIPECFG_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "PIPECFG_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration files and report every problem found.
    Validate(ValidateArgs),

    /// Print the normalized configuration with defaults filled in.
    Show(ShowArgs),

    /// Print the ingestion settings and the stages the configuration requires.
    Plan(PlanArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Configuration file to load.
    #[arg(default_value = DEFAULT_CONFIG_FILE, env = "PIPECFG_CONFIG")]
    pub file: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "yaml")]
    pub format: DocumentFormat,

    /// Print only one top-level section.
    #[arg(short, long)]
    pub section: Option<Section>,
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Configuration file to load.
    #[arg(default_value = DEFAULT_CONFIG_FILE, env = "PIPECFG_CONFIG")]
    pub file: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// CSV header line of the dataset to check the declared columns against.
    #[arg(long)]
    pub header: Option<String>,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Output format for configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentFormat {
    /// YAML, loadable again as a configuration.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Top-level configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Dataset,
    Preprocessing,
    FeatureEngineering,
    Model,
    Evaluation,
}

impl Section {
    /// Key of the section in the document.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Preprocessing => "preprocessing",
            Self::FeatureEngineering => "feature_engineering",
            Self::Model => "model",
            Self::Evaluation => "evaluation",
        }
    }
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
