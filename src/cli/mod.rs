//! Command-line interface
//!
//! Argument definitions and command handlers for the `pipecfg` binary.

pub mod args;
pub mod commands;
