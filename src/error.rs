//! Error types for `pipecfg`
//!
//! Configuration errors carry the dotted path of the offending field so that
//! callers can point users at the exact line of the document to fix.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::schema::{Algorithm, Metric, TaskType};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `pipecfg` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `pipecfg` operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One or more files failed `pipecfg validate`
    #[error("{invalid} of {total} configuration file(s) failed validation")]
    ValidationFailed {
        /// Number of files that did not validate
        invalid: usize,
        /// Number of files checked
        total: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ValidationFailed { .. } | Self::Yaml(_) => {
                ExitCode::CONFIG_ERROR
            }
            Self::Json(_) => ExitCode::ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// YAML parsing failed or the document has no usable root
    #[error("parse error{}: {message}", line_suffix(.line.as_ref()))]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Enum field holds a value outside its option set
    #[error(
        "invalid value '{value}' for '{field}': expected one of {}{}",
        .allowed.join(", "),
        suggestion_suffix(.suggestion.as_deref())
    )]
    InvalidOption {
        /// Dotted path of the field
        field: String,
        /// The value found in the document
        value: String,
        /// Every value the field accepts
        allowed: Vec<&'static str>,
        /// Closest allowed value, when one is near enough to be a typo
        suggestion: Option<String>,
    },

    /// Numeric (or length-constrained) field is out of range
    #[error("value {value} for '{field}' is out of range: expected {constraint}")]
    InvalidRange {
        /// Dotted path of the field
        field: String,
        /// The value found in the document
        value: String,
        /// Human-readable constraint
        constraint: String,
    },

    /// Field has the wrong YAML type
    #[error("wrong type for '{field}': expected {expected}, found {found}")]
    InvalidType {
        /// Dotted path of the field
        field: String,
        /// Expected YAML type
        expected: &'static str,
        /// YAML type actually present
        found: &'static str,
    },

    /// Evaluation metric does not apply to the model's task
    #[error("metric '{metric}' at '{field}' cannot be used with a {task} model")]
    IncompatibleMetric {
        /// Dotted path of the metric entry
        field: String,
        /// The offending metric
        metric: Metric,
        /// Task declared in `model.type`
        task: TaskType,
    },

    /// Model algorithm does not support the declared task
    #[error("algorithm '{algorithm}' cannot be used for {task}")]
    IncompatibleAlgorithm {
        /// The declared algorithm
        algorithm: Algorithm,
        /// Task declared in `model.type`
        task: TaskType,
    },

    /// Required field is absent and has no default
    #[error("missing required field '{field}'")]
    MissingField {
        /// Dotted path of the missing field
        field: String,
    },

    /// Two input columns share a name
    #[error("duplicate column name '{name}' at '{field}'")]
    DuplicateColumn {
        /// Dotted path of the second occurrence
        field: String,
        /// The repeated column name
        name: String,
    },

    /// A dataset lacks columns the configuration declares
    #[error("dataset is missing declared column(s): {}", .columns.join(", "))]
    MissingColumns {
        /// Declared columns absent from the dataset header
        columns: Vec<String>,
    },

    /// Configuration file not found or unreadable
    #[error("file not found: {}", .path.display())]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("configuration is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Environment variable referenced with `${VAR:?msg}` is not set
    #[error("environment variable '{var}' not set ({location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Message supplied with the reference
        location: String,
    },
}

impl ConfigError {
    /// Dotted path of the field the error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidOption { field, .. }
            | Self::InvalidRange { field, .. }
            | Self::InvalidType { field, .. }
            | Self::IncompatibleMetric { field, .. }
            | Self::MissingField { field }
            | Self::DuplicateColumn { field, .. } => Some(field),
            Self::IncompatibleAlgorithm { .. } => Some("model.algorithm"),
            Self::ParseError { .. }
            | Self::MissingColumns { .. }
            | Self::MissingFile { .. }
            | Self::TooLarge { .. }
            | Self::EnvVarNotSet { .. } => None,
        }
    }
}

fn line_suffix(line: Option<&usize>) -> String {
    line.map_or_else(String::new, |l| format!(" at line {l}"))
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Validation Types
// ============================================================================

/// A warning found while validating a document. The configuration still
/// loads; errors are reported as [`ConfigError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the field (e.g. `feature_engineering.numeric.n_components`)
    pub path: String,
    /// Description of the issue
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warning: {} at {}", self.message, self.path)
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `pipecfg` operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// Tests
// ============================================================================
