// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::bmp180::{Bmp180, Oversampling, DEFAULT_ADDRESS, DEFAULT_BUS_PATH};
use crate::error::{Error, Result};
use crate::reading::Measurements;
use crate::sensor::Sensor;
use tracing::{debug, info};

fn unavailable<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
    Error::DeviceUnavailable(Box::new(e))
}

/// Opens a sensor, reads temperature then pressure, and closes it again.
///
/// The sensor only lives inside this call: it is dropped before
/// returning, on success and on every error path.
pub fn acquire<S, E, F>(open: F) -> Result<Measurements>
where
    S: Sensor,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce() -> std::result::Result<S, E>,
{
    let mut sensor = open().map_err(unavailable)?;
    let temperature = sensor.temperature_celsius().map_err(unavailable)?;
    let pressure = sensor.pressure_hpa().map_err(unavailable)?;
    info!(temperature, pressure, "acquired measurements");
    Ok(Measurements {
        temperature,
        pressure,
    })
}

/// Reads the BMP180 on bus 1 at its default address
pub fn acquire_default() -> Result<Measurements> {
    debug!(path = DEFAULT_BUS_PATH, address = DEFAULT_ADDRESS, "acquiring");
    acquire(|| Bmp180::new().map(|bmp| bmp.with_oversampling(Oversampling::Standard)))
}
