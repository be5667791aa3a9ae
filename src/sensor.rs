// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::bmp180::{Bmp180, Bmp180Error};
use i2cdev::core::I2CDevice;
use std::error::Error;

/// Trait for sensors that provide temperature and barometric pressure readings.
///
/// The acquisition step only depends on this trait, so other sensor models
/// or a test double can stand in for the BMP180.
pub trait Sensor {
    type Error: Error + Send + Sync + 'static;

    /// Get a temperature from the sensor in degrees Celsius
    fn temperature_celsius(&mut self) -> Result<f64, Self::Error>;

    /// Get a pressure reading from the sensor in hectopascal
    fn pressure_hpa(&mut self) -> Result<f64, Self::Error>;
}

impl<D> Sensor for Bmp180<D>
where
    D: I2CDevice,
    D::Error: Send + Sync + 'static,
{
    type Error = Bmp180Error;

    fn temperature_celsius(&mut self) -> Result<f64, Bmp180Error> {
        self.read_temperature()
    }

    fn pressure_hpa(&mut self) -> Result<f64, Bmp180Error> {
        self.read_pressure()
    }
}
