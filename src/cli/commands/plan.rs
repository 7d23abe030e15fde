//! `pipecfg plan`
//!
//! Shows what a pipeline run would do with a configuration: where data is
//! read and written, which preprocessing stages run on which columns, and
//! what is trained and measured.

use std::fmt::Write;

use serde::Serialize;

use crate::cli::args::{OutputFormat, PlanArgs};
use crate::config::schema::{OptionSet, PipelineConfig};
use crate::config::views::{EvaluationView, IngestionSettings, ModelView, Stage};
use crate::error::PipelineError;

#[derive(Debug, Serialize)]
struct Plan<'a> {
    ingestion: IngestionSettings<'a>,
    stages: Vec<Stage<'a>>,
    model: ModelView<'a>,
    evaluation: EvaluationView<'a>,
}

impl<'a> Plan<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        Self {
            ingestion: config.ingestion(),
            stages: config.stages(),
            model: config.model_view(),
            evaluation: config.evaluation_view(),
        }
    }
}

/// Print the run plan for a configuration.
///
/// # Errors
///
/// Returns a config error if the file fails to load or, with `--header`,
/// if the header lacks a declared column.
pub fn run(args: &PlanArgs) -> Result<(), PipelineError> {
    let config = super::load_config(&args.file)?;

    if let Some(header) = &args.header {
        let columns = parse_header(header);
        config.check_columns(columns.iter().map(String::as_str))?;
        tracing::info!(columns = columns.len(), "dataset header covers declared columns");
    }

    let plan = Plan::new(&config);
    match args.format {
        OutputFormat::Human => print!("{}", render_human(&plan)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    }
    Ok(())
}

/// Splits a CSV header line into column names. Quoted names may contain
/// commas and `""` escapes.
fn parse_header(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut name = String::new();
    let mut quoted = false;
    let mut chars = line.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.next_if_eq(&'"').is_some() => name.push('"'),
            '"' => quoted = !quoted,
            ',' if !quoted => columns.push(std::mem::take(&mut name)),
            _ => name.push(c),
        }
    }
    columns.push(name);

    columns
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn render_human(plan: &Plan<'_>) -> String {
    let mut out = String::new();
    let ingestion = &plan.ingestion;

    let _ = writeln!(out, "input:   {}", ingestion.data_path);
    let _ = writeln!(out, "output:  {}", ingestion.output_dir);
    let _ = writeln!(
        out,
        "split:   test_size={} random_state={}",
        ingestion.test_size, ingestion.random_state
    );

    let _ = writeln!(out, "stages:");
    for stage in &plan.stages {
        let _ = writeln!(out, "  {:<12} {}", stage.kind, stage.columns.join(", "));
    }

    let model = plan.model.model;
    let _ = write!(out, "model:   {} {}", model.algorithm, model.task);
    for (name, value) in &model.hyperparameters {
        let _ = write!(out, " {name}={value}");
    }
    let _ = writeln!(out);

    let metrics: Vec<&str> = plan.evaluation.metrics.iter().map(|m| m.as_str()).collect();
    let _ = writeln!(out, "metrics: {}", metrics.join(", "));
    out
}
