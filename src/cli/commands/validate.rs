//! `pipecfg validate`
//!
//! Checks each file independently and reports every error and warning,
//! not just the first. A file that cannot be read is reported like any
//! other invalid file so the remaining files are still checked.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::loader::ConfigLoader;
use crate::error::PipelineError;

/// Outcome for a single file.
#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    valid: bool,
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

/// One reported problem.
#[derive(Debug, Serialize)]
struct Issue {
    /// Dotted field path, when the problem has one
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    files: Vec<FileReport>,
    summary: Summary,
}

/// Validate configuration files.
///
/// # Errors
///
/// Returns [`PipelineError::ValidationFailed`] if any file is invalid
/// (or, with `--strict`, has warnings).
pub fn run(args: &ValidateArgs) -> Result<(), PipelineError> {
    let loader = ConfigLoader::with_defaults();

    let files: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&loader, path, args.strict))
        .collect();

    let invalid = files.iter().filter(|f| !f.valid).count();
    let report = Report {
        summary: Summary {
            total: files.len(),
            valid: files.len() - invalid,
            invalid,
        },
        files,
    };

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if invalid > 0 {
        return Err(PipelineError::ValidationFailed {
            invalid,
            total: report.summary.total,
        });
    }
    Ok(())
}

fn check_file(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    tracing::info!(file = %path.display(), "validating configuration");

    let (errors, warnings) = match loader.inspect(path) {
        Ok(inspection) => {
            let errors = inspection
                .validation
                .errors
                .iter()
                .map(|e| Issue {
                    field: e.field().map(str::to_string),
                    message: e.to_string(),
                })
                .collect();
            let warnings = inspection
                .env_warnings
                .into_iter()
                .map(|w| Issue {
                    field: None,
                    message: w.message,
                })
                .chain(inspection.validation.warnings.into_iter().map(|w| Issue {
                    field: Some(w.path),
                    message: w.message,
                }))
                .collect();
            (errors, warnings)
        }
        Err(e) => (
            vec![Issue {
                field: e.field().map(str::to_string),
                message: e.to_string(),
            }],
            Vec::new(),
        ),
    };

    let valid = errors.is_empty() && !(strict && !warnings.is_empty());
    if valid {
        tracing::info!(file = %path.display(), "configuration valid");
    } else {
        tracing::info!(
            file = %path.display(),
            errors = errors.len(),
            warnings = warnings.len(),
            "configuration invalid"
        );
    }

    FileReport {
        path: path.display().to_string(),
        valid,
        errors,
        warnings,
    }
}

fn render_human(report: &Report) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for file in &report.files {
        let status = if file.valid { "ok" } else { "FAILED" };
        let _ = writeln!(out, "{}: {status}", file.path);
        for issue in &file.errors {
            let _ = writeln!(out, "  error: {}", issue.message);
        }
        for issue in &file.warnings {
            match &issue.field {
                Some(field) => {
                    let _ = writeln!(out, "  warning: {} at {field}", issue.message);
                }
                None => {
                    let _ = writeln!(out, "  warning: {}", issue.message);
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "{} of {} file(s) valid",
        report.summary.valid, report.summary.total
    );
    out
}
