//! `pipecfg show`
//!
//! Prints the configuration as the validator understood it, with every
//! default filled in. The YAML output is itself a loadable document.

use serde_yaml::{Mapping, Value};

use crate::cli::args::{DocumentFormat, Section, ShowArgs};
use crate::config::schema::PipelineConfig;
use crate::error::PipelineError;

/// Print the normalized configuration.
///
/// # Errors
///
/// Returns a config error if the file fails to load, or a serialization
/// error if rendering fails.
pub fn run(args: &ShowArgs) -> Result<(), PipelineError> {
    let config = super::load_config(&args.file)?;
    let document = select(&config, args.section)?;
    print!("{}", render(&document, args.format)?);
    Ok(())
}

/// The whole document, or a mapping holding only `section`.
fn select(config: &PipelineConfig, section: Option<Section>) -> Result<Value, PipelineError> {
    let document = serde_yaml::to_value(config)?;
    let Some(section) = section else {
        return Ok(document);
    };

    let mut selected = Mapping::new();
    if let Some(value) = document.get(section.key()) {
        selected.insert(Value::from(section.key()), value.clone());
    }
    Ok(Value::Mapping(selected))
}

fn render(document: &Value, format: DocumentFormat) -> Result<String, PipelineError> {
    Ok(match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        DocumentFormat::Json => format!("{}\n", serde_json::to_string_pretty(document)?),
    })
}
