// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Prints one BMP180 reading as JSON on stdout.
//!
//! Takes no arguments. Diagnostics go to stderr, stdout only ever carries
//! the report.

use anyhow::{Context, Result};
use bmp180_reader::{acquire, emit_stdout, Report};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .init();

    let measurements = acquire::acquire_default().context("Failed to read BMP180")?;
    let report = Report::from_measurements(measurements);
    emit_stdout(&report).context("Failed to emit report")?;
    Ok(())
}
