//! Observability module
//!
//! Structured logging for `pipecfg` runs.

pub mod logging;

pub use logging::{LogFormat, LogSettings, init_logging};
