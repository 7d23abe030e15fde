//! Logging setup for `pipecfg`.
//!
//! Log lines go to stderr so that `show`, `plan` and `validate --format json`
//! keep stdout machine-readable. `PIPECFG_LOG_LEVEL` takes any `EnvFilter`
//! directive and overrides the command-line flags.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, ColorChoice};

/// Environment variable overriding the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "PIPECFG_LOG_LEVEL";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines, colored on a terminal.
    #[default]
    Human,
    /// One flat JSON object per event.
    Json,
}

/// How a run logs, taken from the global CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Number of `-v` flags.
    pub verbosity: u8,
    pub quiet: bool,
    pub color: ColorChoice,
}

impl LogSettings {
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.log_format,
            verbosity: cli.verbose,
            quiet: cli.quiet,
            color: cli.color,
        }
    }

    /// Filter directive used when `PIPECFG_LOG_LEVEL` is unset.
    ///
    /// `-v` and `-vv` raise only this crate's events; dependencies stay at
    /// `warn` until `-vvv`.
    #[must_use]
    pub const fn directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "warn,pipecfg=info",
            2 => "warn,pipecfg=debug",
            _ => "trace",
        }
    }

    /// Whether stderr gets ANSI colors. `auto` honors `NO_COLOR`.
    #[must_use]
    pub fn ansi(&self) -> bool {
        match self.color {
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(settings: &LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_target(settings.verbosity >= 2)
        .with_writer(std::io::stderr);

    let _ = match settings.format {
        LogFormat::Human => builder.without_time().with_ansi(settings.ansi()).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
}
