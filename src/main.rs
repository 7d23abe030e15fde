//! `pipecfg` - validate and inspect ML pipeline configuration documents

use clap::Parser;

use pipecfg::cli::args::Cli;
use pipecfg::cli::commands;
use pipecfg::error::ExitCode;
use pipecfg::observability::{LogSettings, init_logging};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::USAGE_ERROR
            } else {
                ExitCode::SUCCESS
            };
            std::process::exit(code);
        }
    };

    init_logging(&LogSettings::from_cli(&cli));

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
