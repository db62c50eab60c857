//! # clara-install — ClaraVerse remote server installer
//!
//! Checks for Docker and a GPU, asks which services to deploy, starts them
//! with Docker Compose, and waits until they answer their health checks.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod cli;
mod prompt;
mod style;
mod summary;
mod workflow;

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use clara_common::constants::EXIT_FAILURE;

use crate::cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if !style::enable_ansi() {
        tracing::debug!("terminal did not report ANSI support");
    }

    // Usage errors share the failure status of every other failed run.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    cli::execute(&cli).exit_code()
}
