// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! tapfmt: format TAP test output with pluggable reporters
//!
//! Reads TAP on stdin, renders it with the named reporter and exits with
//! status 1 if the run did not pass.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tapfmt::config::{Config, usage};
use tapfmt::driver;
use tracing::error;

fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if config.reporter.is_none() {
        println!("{}", usage());
        return ExitCode::SUCCESS;
    }

    if let Err(err) = config.validate() {
        error!(error = %err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    let stdout = Box::new(io::stdout());
    match runtime.block_on(driver::run(&config, tokio::io::stdin(), stdout)) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            error!("tapfmt failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
