//! Shared helpers for integration tests that drive the `pipecfg` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Runs the built `pipecfg` binary.
pub struct PipecfgProcess;

impl PipecfgProcess {
    /// Path to a file under `tests/fixtures/`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    /// Path to the reference document at the repository root.
    pub fn reference_config() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml")
    }

    /// Runs `pipecfg` with `args` to completion.
    ///
    /// Environment variables that change CLI behavior are cleared so the
    /// host environment cannot leak into assertions.
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .output()
            .expect("failed to run pipecfg binary")
    }

    /// Like [`Self::spawn_command`], with extra environment variables.
    pub fn spawn_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Self::command(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("failed to run pipecfg binary")
    }

    fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pipecfg"));
        cmd.args(args)
            .env_remove("PIPECFG_CONFIG")
            .env_remove("PIPECFG_COLOR")
            .env_remove("PIPECFG_LOG_FORMAT")
            .env_remove("PIPECFG_LOG_LEVEL")
            .env_remove("PIPECFG_MAX_CONFIG_SIZE")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// Stdout of a finished process as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished process as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
