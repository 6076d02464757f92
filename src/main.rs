//! Outboard Quote CLI

use std::{io, process::ExitCode};

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

mod cli;
mod logging;

/// Outboard Quote CLI entry point
pub fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(init_error) = logging::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Failed to initialize logging: {init_error}");
        }

        return ExitCode::FAILURE;
    }

    match cli::run(cli, io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(run_error) => {
            error!(error = %run_error, "quote failed");

            #[expect(
                clippy::print_stderr,
                reason = "errors must reach the operator whatever the log level"
            )]
            {
                eprintln!("{run_error}");
            }

            ExitCode::FAILURE
        }
    }
}
