//! Configuration loader
//!
//! This module implements the loading pipeline:
//! 1. Size check and UTF-8 BOM handling
//! 2. Environment variable expansion (pre-parse, on raw text)
//! 3. YAML parsing into a [`RawDocument`]
//! 4. Validation into a typed [`PipelineConfig`]
//! 5. Freeze with `Arc`
//!
//! [`parse`], [`load`] and [`to_yaml`] are the pure text-level operations;
//! [`ConfigLoader`] adds file access and environment expansion on top.

use crate::config::schema::PipelineConfig;
use crate::config::validation::{ValidationResult, Validator};
use crate::error::ConfigError;

use serde_yaml::{Mapping, Value};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Text-Level Operations
// ============================================================================

/// A parsed but not yet validated configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    root: Mapping,
}

impl RawDocument {
    /// The root mapping of the document.
    #[must_use]
    pub const fn root(&self) -> &Mapping {
        &self.root
    }
}

/// Parses raw document text into nested mappings.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] on malformed YAML, an empty document,
/// or a document whose root is not a mapping.
pub fn parse(raw_text: &str) -> Result<RawDocument, ConfigError> {
    let raw_text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);

    if is_blank(raw_text) {
        return Err(empty_document());
    }

    let root: Value = serde_yaml::from_str(raw_text).map_err(|e| ConfigError::ParseError {
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })?;

    match root {
        Value::Mapping(root) => Ok(RawDocument { root }),
        Value::Null => Err(empty_document()),
        other => Err(ConfigError::ParseError {
            line: None,
            message: format!(
                "Configuration root must be a mapping of sections, found {}",
                describe(&other)
            ),
        }),
    }
}

/// Parses and validates raw document text.
///
/// # Errors
///
/// Returns the parse error, or the first validation error in document order.
pub fn load(raw_text: &str) -> Result<PipelineConfig, ConfigError> {
    let document = parse(raw_text)?;
    crate::config::validation::validate(&document)
}

/// Serializes a configuration back to the document format.
///
/// Loading the output yields a configuration equal to `config`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn to_yaml(config: &PipelineConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}

/// True when the text holds only whitespace and comments.
fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn empty_document() -> ConfigError {
    ConfigError::ParseError {
        line: None,
        message: "Configuration document is empty".to_string(),
    }
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Null => "nothing",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "a scalar",
        Value::Tagged(_) => "a tagged value",
    }
}

// ============================================================================
// File Loader
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Expand `${VAR}` references before parsing.
    pub expand_env: bool,

    /// Limits for configuration size.
    pub config_limits: ConfigLimits,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            expand_env: true,
            config_limits: ConfigLimits::default(),
        }
    }
}

/// Limits for configuration size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("PIPECFG_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<PipelineConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Everything learned about a document without failing on validation
/// errors. Used by `pipecfg validate` to report all problems at once.
#[derive(Debug)]
pub struct Inspection {
    /// Warnings from environment expansion.
    pub env_warnings: Vec<LoadWarning>,

    /// Full validation outcome.
    pub validation: ValidationResult,
}

impl Inspection {
    /// Converts into a [`LoadResult`], failing on the first validation error.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in document order.
    pub fn into_load_result(self) -> Result<LoadResult, ConfigError> {
        let mut warnings = self.env_warnings;
        warnings.extend(self.validation.warnings.iter().map(|issue| LoadWarning {
            message: issue.message.clone(),
            location: Some(issue.path.clone()),
        }));
        let config = self.validation.into_config()?;

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

/// Configuration loader.
///
/// Handles the full loading pipeline from a YAML file to a frozen
/// `PipelineConfig`.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing fails
    /// - Validation fails (the first error is returned)
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        self.inspect(path)?.into_load_result()
    }

    /// Loads a configuration from in-memory text.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus file access.
    pub fn load_from_str(&self, raw: &str) -> Result<LoadResult, ConfigError> {
        self.inspect_str(raw, "<inline>")?.into_load_result()
    }

    /// Reads, expands and parses a file, then validates it without failing on
    /// validation errors.
    ///
    /// # Errors
    ///
    /// Returns an error only for problems that prevent validation from
    /// running at all (I/O, size, environment, YAML syntax).
    pub fn inspect(&self, path: &Path) -> Result<Inspection, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let limit = self.options.config_limits.max_config_size;
        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > limit {
            return Err(ConfigError::TooLarge {
                size: file_size,
                limit,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ConfigError::ParseError {
                    line: None,
                    message: "Configuration file is not valid UTF-8".to_string(),
                }
            } else {
                ConfigError::MissingFile {
                    path: path.to_path_buf(),
                }
            }
        })?;

        tracing::debug!(path = %path.display(), bytes = raw.len(), "read configuration");
        self.inspect_str(&raw, &path.display().to_string())
    }

    /// Like [`ConfigLoader::inspect`], for in-memory text. `source` names the
    /// text in warnings.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::inspect`].
    pub fn inspect_str(&self, raw: &str, source: &str) -> Result<Inspection, ConfigError> {
        let limit = self.options.config_limits.max_config_size;
        if raw.len() > limit {
            return Err(ConfigError::TooLarge {
                size: raw.len(),
                limit,
            });
        }

        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let expanded = if self.options.expand_env {
            env_sub.substitute(raw, source)?
        } else {
            raw.to_string()
        };

        let document = parse(&expanded)?;
        tracing::debug!(
            source,
            sections = document.root().len(),
            "parsed configuration document"
        );

        let validation = Validator::new().validate(&document);
        tracing::debug!(
            source,
            errors = validation.errors.len(),
            warnings = validation.warnings.len(),
            "validated configuration"
        );

        Ok(Inspection {
            env_warnings: env_sub.warnings,
            validation,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text BEFORE parsing to preserve type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    ///
    /// Comments (a `#` at line start or after whitespace, outside quotes)
    /// are copied through untouched.
    fn substitute(&mut self, raw_yaml: &str, source: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();
        let mut quote: Option<char> = None;
        let mut prev = '\n';

        while let Some(c) = chars.next() {
            match c {
                '\n' => quote = None,
                '#' if quote.is_none() && prev.is_whitespace() => {
                    result.push(c);
                    while let Some(next) = chars.next_if(|&next| next != '\n') {
                        result.push(next);
                    }
                    prev = c;
                    continue;
                }
                '\\' if quote == Some('"') => {
                    result.push(c);
                    prev = chars.next().map_or(c, |escaped| {
                        result.push(escaped);
                        escaped
                    });
                    continue;
                }
                '"' | '\'' => match quote {
                    Some('\'') if c == '\'' && chars.next_if_eq(&'\'').is_some() => {
                        result.push(c);
                    }
                    Some(open) if open == c => quote = None,
                    None if opens_scalar(prev) => quote = Some(c),
                    _ => {}
                },
                '$' => {
                    self.expand_dollar(&mut chars, &mut result, source)?;
                    prev = c;
                    continue;
                }
                _ => {}
            }
            result.push(c);
            prev = c;
        }

        Ok(result)
    }

    /// Handles the text after a `$` outside comments.
    fn expand_dollar(
        &mut self,
        chars: &mut std::iter::Peekable<std::str::Chars>,
        result: &mut String,
        source: &str,
    ) -> Result<(), ConfigError> {
        match chars.peek() {
            Some('$') => {
                chars.next();
                result.push('$');
            }
            Some('{') => {
                chars.next();
                let reference = Self::parse_reference(chars)?;
                match std::env::var(&reference.name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => match reference.fallback {
                        Fallback::Default(default) => result.push_str(&default),
                        Fallback::Required(message) => {
                            return Err(ConfigError::EnvVarNotSet {
                                var: reference.name,
                                location: message,
                            });
                        }
                        Fallback::Empty => {
                            self.warnings.push(LoadWarning {
                                message: format!(
                                    "Environment variable '{}' is not set, using empty string",
                                    reference.name
                                ),
                                location: Some(source.to_string()),
                            });
                        }
                    },
                }
            }
            _ => result.push('$'),
        }
        Ok(())
    }

    /// Parses a variable reference after the opening `${`.
    fn parse_reference(
        chars: &mut std::iter::Peekable<std::str::Chars>,
    ) -> Result<EnvReference, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next_if(|&c| c != '\n') {
            match c {
                '}' => {
                    return Ok(EnvReference {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' => match chars.peek() {
                    Some('-') => {
                        chars.next();
                        let default = Self::read_until_close(chars)?;
                        return Ok(EnvReference {
                            name,
                            fallback: Fallback::Default(default),
                        });
                    }
                    Some('?') => {
                        chars.next();
                        let message = Self::read_until_close(chars)?;
                        return Ok(EnvReference {
                            name,
                            fallback: Fallback::Required(message),
                        });
                    }
                    _ => name.push(':'),
                },
                _ => name.push(c),
            }
        }

        Err(ConfigError::ParseError {
            line: None,
            message: format!("Unclosed environment variable reference: ${{{name}"),
        })
    }

    /// Reads content until the matching `}`, handling nested braces.
    fn read_until_close(
        chars: &mut std::iter::Peekable<std::str::Chars>,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1;

        while let Some(c) = chars.next_if(|&c| c != '\n') {
            match c {
                '{' => {
                    depth += 1;
                    value.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                    value.push(c);
                }
                _ => value.push(c),
            }
        }

        Err(ConfigError::ParseError {
            line: None,
            message: "Unclosed environment variable reference".to_string(),
        })
    }
}

/// True when a quote after `prev` starts a quoted scalar rather than
/// sitting inside a plain one (`it's`).
const fn opens_scalar(prev: char) -> bool {
    prev.is_ascii_whitespace() || matches!(prev, ':' | '-' | '[' | '{' | ',')
}

/// A `${...}` reference.
struct EnvReference {
    name: String,
    fallback: Fallback,
}

/// What to do when the referenced variable is unset.
enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
