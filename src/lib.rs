// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! BMP180 one-shot reader
//!
//! Reads one temperature and one pressure sample from a BMP180 on the Linux I2C bus
//! and turns them into a JSON report, as consumed by home automation collectors:
//!
//!```text
//![{"unit":"celsius","value":22.5,"kind":"temperature","accessory_type":"Temperature"},{"unit":"hpa","value":1013.25,"kind":"pressure","accessory_type":"Pressure"}]
//!```
//!
//! Register layout and compensation taken from the
//! [BMP180 datasheet](https://cdn-shop.adafruit.com/datasheets/BST-BMP180-DS000-09.pdf)
//!
//! ## Basic Example
//!
//!```no_run
//!use bmp180_reader::{acquire, emit_stdout, Report};
//!
//!fn main() -> Result<(), bmp180_reader::Error> {
//!    let measurements = acquire::acquire_default()?;
//!    emit_stdout(&Report::from_measurements(measurements))
//!}
//!```
//!

/// Acquisition of one temperature and pressure pair
pub mod acquire;
/// Linux I2C driver for the BMP180
pub mod bmp180;
/// Report emission
pub mod emit;
pub mod error;
pub mod reading;
/// Capability trait the acquisition step reads through
pub mod sensor;

pub use emit::{emit, emit_stdout};
pub use error::{Error, Result};
pub use reading::{Measurements, Reading, Report};
pub use sensor::Sensor;
