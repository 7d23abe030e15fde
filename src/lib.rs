//! `pipecfg` - configuration layer for a machine-learning pipeline
//!
//! Parses and validates a YAML pipeline document (dataset, preprocessing,
//! feature engineering, model and evaluation settings) into a typed,
//! immutable [`config::PipelineConfig`] and serializes it back.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
