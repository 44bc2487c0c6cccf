// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Driver: pumps input into a formatter and returns the run outcome

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::config::Config;
use crate::formatter::{Formatter, RunOutcome};

/// Bytes requested per read
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Read `input` to the end, formatting it with the configured reporter
///
/// Yields to the runtime whenever the formatter signals backpressure.
///
/// # Errors
///
/// Returns an error if no reporter is configured, the reporter cannot be
/// created, reading fails, or the report cannot be written.
pub async fn run<R>(config: &Config, mut input: R, stdout: Box<dyn Write>) -> Result<RunOutcome>
where
    R: AsyncRead + Unpin,
{
    let name = config
        .reporter
        .as_deref()
        .context("No reporter given")?;
    let mut formatter = Formatter::new(name, &config.reporter_options(), stdout)
        .with_context(|| format!("Failed to create reporter '{name}'"))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0usize;
    loop {
        let read = input
            .read(&mut buf)
            .await
            .context("Failed to read TAP input")?;
        if read == 0 {
            break;
        }
        total += read;
        if !formatter.write(&buf[..read])? {
            debug!(total, "backpressure, yielding");
            tokio::task::yield_now().await;
        }
    }

    formatter.end()?;
    let outcome = formatter.finish().context("Failed to finish report")?;
    info!(
        reporter = %formatter.kind(),
        bytes = total,
        ok = outcome.ok,
        failures = outcome.failures,
        "formatting complete"
    );
    Ok(outcome)
}
