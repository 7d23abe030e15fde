//! Configuration module
//!
//! Parses, validates and serializes pipeline configuration documents, and
//! hands each pipeline collaborator a read-only view of its subsection.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod views;

pub use loader::{
    ConfigLimits, ConfigLoader, Inspection, LoadResult, LoadWarning, LoaderOptions, RawDocument,
    load, parse, to_yaml,
};
pub use schema::*;
pub use validation::{ValidationResult, Validator, validate};
pub use views::{
    CategoricalView, EvaluationView, IngestionSettings, ModelView, NumericView, Stage, TextView,
};
