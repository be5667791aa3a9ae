// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types for the reading-to-report pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a run. None of them is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The bus could not be opened or the sensor did not answer.
    #[error("sensor device unavailable: {0}")]
    DeviceUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The report could not be encoded.
    #[error("could not serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The encoded report could not be written out.
    #[error("could not write report: {0}")]
    Write(#[from] std::io::Error),
}
