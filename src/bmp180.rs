// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use i2cdev::core::*;
use i2cdev::linux::LinuxI2CDevice;
use std::{thread, time};
use thiserror::Error;
use tracing::debug;

/// Bus the sensor is wired to on a Raspberry Pi
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-1";
/// Documented default address of the BMP180
pub const DEFAULT_ADDRESS: u16 = 0x77;

const CHIP_ID: u8 = 0x55;

const REG_CALIBRATION: u8 = 0xAA;
const REG_CHIP_ID: u8 = 0xD0;
const REG_SOFT_RESET: u8 = 0xE0;
const REG_CONTROL: u8 = 0xF4;
const REG_OUT_MSB: u8 = 0xF6;

const CMD_TEMPERATURE: u8 = 0x2E;
const CMD_PRESSURE: u8 = 0x34;
const CMD_SOFT_RESET: u8 = 0xB6;

///
///BMP180 error enum. Bus wraps whatever error the
///underlying I2C device reported. UnexpectedChipId when
///the device at the address is not a BMP180. InvalidCalibration
///when the factory calibration EEPROM reads back blank
///
#[derive(Error, Debug)]
pub enum Bmp180Error {
    /// Read or write on the I2C bus failed
    #[error("I2C bus error: {0}")]
    Bus(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Chip id register did not read 0x55
    #[error("unexpected chip id 0x{0:02x}, expected 0x55")]
    UnexpectedChipId(u8),
    /// A calibration word read 0x0000 or 0xFFFF
    #[error("calibration word {0} is blank")]
    InvalidCalibration(usize),
}

impl Bmp180Error {
    fn bus<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        Bmp180Error::Bus(Box::new(e))
    }
}

/// Pressure oversampling setting (`oss` in the datasheet).
/// Higher settings trade conversion time for lower noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oversampling {
    UltraLowPower,
    #[default]
    Standard,
    HighResolution,
    UltraHighResolution,
}

impl Oversampling {
    /// The `oss` value written to bits 6..7 of the control register
    pub fn oss(self) -> u8 {
        match self {
            Oversampling::UltraLowPower => 0,
            Oversampling::Standard => 1,
            Oversampling::HighResolution => 2,
            Oversampling::UltraHighResolution => 3,
        }
    }

    /// Maximum conversion time, rounded up to whole milliseconds
    fn conversion_time(self) -> time::Duration {
        let millis = match self {
            Oversampling::UltraLowPower => 5,
            Oversampling::Standard => 8,
            Oversampling::HighResolution => 14,
            Oversampling::UltraHighResolution => 26,
        };
        time::Duration::from_millis(millis)
    }
}

/// Factory calibration coefficients, stored in the sensor EEPROM
/// as eleven big-endian 16 bit words starting at 0xAA.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl Calibration {
    /// Parses the 22 byte calibration block.
    /// Every word must be neither 0x0000 nor 0xFFFF, otherwise the
    /// EEPROM is considered unreadable.
    pub fn from_bytes(data: &[u8; 22]) -> Result<Calibration, Bmp180Error> {
        let mut words = [0u16; 11];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u16::from_be_bytes([data[2 * i], data[2 * i + 1]]);
            if *word == 0x0000 || *word == 0xFFFF {
                return Err(Bmp180Error::InvalidCalibration(i));
            }
        }
        Ok(Calibration {
            ac1: words[0] as i16,
            ac2: words[1] as i16,
            ac3: words[2] as i16,
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: words[6] as i16,
            b2: words[7] as i16,
            mb: words[8] as i16,
            mc: words[9] as i16,
            md: words[10] as i16,
        })
    }

    /// Compensates a raw temperature sample.
    /// Returns the temperature in 0.1 Celsius steps together with
    /// the intermediate B5, which pressure compensation needs.
    ///
    pub fn compensate_temperature(&self, ut: i32) -> (i32, i32) {
        let x1 = ((i64::from(ut) - i64::from(self.ac6)) * i64::from(self.ac5)) >> 15;
        let x2 = (i64::from(self.mc) << 11)
            .checked_div(x1 + i64::from(self.md))
            .unwrap_or(0);
        let b5 = (x1 + x2) as i32;
        ((b5 + 8) >> 4, b5)
    }

    /// Compensates a raw pressure sample, result in pascal.
    ///
    /// A real sensor delivers at most 16 + oss bits for `up`. Anything
    /// outside that range saturates instead of overflowing, and the
    /// result is clamped to the `i32` range.
    pub fn compensate_pressure(&self, up: i32, b5: i32, oversampling: Oversampling) -> i32 {
        let oss = u32::from(oversampling.oss());
        let b6 = i64::from(b5) - 4000;
        let x1 = (i64::from(self.b2) * ((b6 * b6) >> 12)) >> 11;
        let x2 = (i64::from(self.ac2) * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = (((i64::from(self.ac1) * 4 + x3) << oss) + 2) >> 2;

        let x1 = (i64::from(self.ac3) * b6) >> 13;
        let x2 = (i64::from(self.b1) * ((b6 * b6) >> 12)) >> 16;
        let x3 = ((x1 + x2) + 2) >> 2;
        let b4 = (i64::from(self.ac4) * (x3 + 32768)) >> 15;
        let b7 = (i64::from(up) - b3) * (50000 >> oss);
        if b4 == 0 {
            return 0;
        }

        let mut p = if b7 < 0x8000_0000 {
            (b7 * 2) / b4
        } else {
            (b7 / b4) * 2
        };
        let x1 = (p >> 8).saturating_mul(p >> 8);
        let x1 = x1.saturating_mul(3038) >> 16;
        let x2 = p.saturating_mul(-7357) >> 16;
        p = p.saturating_add(x1.saturating_add(x2).saturating_add(3791) >> 4);
        p.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// BMP180 Struct, wraps an I2C device
/// and has implemented related BMP180 operations.
/// The bus handle is released when the struct is dropped.
///
pub struct Bmp180<D: I2CDevice> {
    i2cdev: D,
    calibration: Calibration,
    oversampling: Oversampling,
}

impl Bmp180<LinuxI2CDevice> {
    /// Create a new BMP180 Struct
    ///
    /// Tries to create the device on bus 1, standard address 0x77.
    /// If fails, returns a Bmp180Error
    ///
    pub fn new() -> Result<Self, Bmp180Error> {
        Bmp180::open(DEFAULT_BUS_PATH, DEFAULT_ADDRESS)
    }

    /// Opens the sensor on an arbitrary bus device node and address.
    pub fn open(path: &str, address: u16) -> Result<Self, Bmp180Error> {
        debug!(path, address, "opening BMP180");
        let device = LinuxI2CDevice::new(path, address).map_err(Bmp180Error::bus)?;
        Bmp180::with_device(device)
    }
}

impl<D> Bmp180<D>
where
    D: I2CDevice,
    D::Error: Send + Sync + 'static,
{
    /// Wraps an already opened device.
    /// Checks the chip id and loads the calibration block.
    ///
    pub fn with_device(mut i2cdev: D) -> Result<Self, Bmp180Error> {
        let mut id = [0u8; 1];
        read_register(&mut i2cdev, REG_CHIP_ID, &mut id)?;
        if id[0] != CHIP_ID {
            return Err(Bmp180Error::UnexpectedChipId(id[0]));
        }

        let mut data = [0u8; 22];
        read_register(&mut i2cdev, REG_CALIBRATION, &mut data)?;
        let calibration = Calibration::from_bytes(&data)?;
        debug!(?calibration, "loaded calibration");

        Ok(Bmp180 {
            i2cdev,
            calibration,
            oversampling: Oversampling::default(),
        })
    }

    /// Sets the oversampling used for pressure conversions
    pub fn with_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// Calibration coefficients read at construction
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Oversampling used for pressure conversions
    pub fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    /// Soft reset the sensor device.
    /// If fails, return Bmp180Error.
    ///
    pub fn soft_reset(&mut self) -> Result<(), Bmp180Error> {
        self.i2cdev
            .write(&[REG_SOFT_RESET, CMD_SOFT_RESET])
            .map_err(Bmp180Error::bus)?;
        thread::sleep(time::Duration::from_millis(10));
        Ok(())
    }

    /// Starts a temperature conversion and returns the raw sample
    fn read_raw_temperature(&mut self) -> Result<i32, Bmp180Error> {
        self.i2cdev
            .write(&[REG_CONTROL, CMD_TEMPERATURE])
            .map_err(Bmp180Error::bus)?;
        thread::sleep(time::Duration::from_millis(5));
        let mut data = [0u8; 2];
        read_register(&mut self.i2cdev, REG_OUT_MSB, &mut data)?;
        Ok(i32::from(u16::from_be_bytes(data)))
    }

    /// Starts a pressure conversion and returns the raw sample
    fn read_raw_pressure(&mut self) -> Result<i32, Bmp180Error> {
        let oss = self.oversampling.oss();
        self.i2cdev
            .write(&[REG_CONTROL, CMD_PRESSURE + (oss << 6)])
            .map_err(Bmp180Error::bus)?;
        thread::sleep(self.oversampling.conversion_time());
        let mut data = [0u8; 3];
        read_register(&mut self.i2cdev, REG_OUT_MSB, &mut data)?;
        let raw = (i32::from(data[0]) << 16) | (i32::from(data[1]) << 8) | i32::from(data[2]);
        Ok(raw >> (8 - oss))
    }

    /// Reads the compensated temperature in Celsius.
    /// Not rounded to the 0.1 Celsius steps of the integer formula.
    pub fn read_temperature(&mut self) -> Result<f64, Bmp180Error> {
        let ut = self.read_raw_temperature()?;
        let (_, b5) = self.calibration.compensate_temperature(ut);
        debug!(ut, b5, "temperature conversion");
        Ok(f64::from(b5 + 8) / 160.0)
    }

    /// Reads the compensated pressure in hectopascal.
    /// A temperature conversion is always done first, pressure
    /// compensation depends on it.
    pub fn read_pressure(&mut self) -> Result<f64, Bmp180Error> {
        let ut = self.read_raw_temperature()?;
        let (_, b5) = self.calibration.compensate_temperature(ut);
        let up = self.read_raw_pressure()?;
        let pascal = self
            .calibration
            .compensate_pressure(up, b5, self.oversampling);
        debug!(up, pascal, "pressure conversion");
        Ok(f64::from(pascal) / 100.0)
    }
}

/// Selects a register and reads `data.len()` bytes starting there
fn read_register<D>(dev: &mut D, register: u8, data: &mut [u8]) -> Result<(), Bmp180Error>
where
    D: I2CDevice,
    D::Error: Send + Sync + 'static,
{
    dev.write(&[register]).map_err(Bmp180Error::bus)?;
    dev.read(data).map_err(Bmp180Error::bus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cdev::mock::MockI2CDevice;

    // Worked example from the BMP180 datasheet
    const DATASHEET_CALIBRATION: [u8; 22] = [
        0x01, 0x98, 0xff, 0xb8, 0xc7, 0xd1, 0x7f, 0xe5, 0x7f, 0xf5, 0x5a, 0x71, 0x18, 0x2e, 0x00,
        0x04, 0x80, 0x00, 0xdd, 0xf9, 0x0b, 0x34,
    ];

    fn datasheet() -> Calibration {
        Calibration::from_bytes(&DATASHEET_CALIBRATION).unwrap()
    }

    fn mock_sensor() -> MockI2CDevice {
        let mut dev = MockI2CDevice::new();
        dev.regmap.write_regs(REG_CHIP_ID as usize, &[CHIP_ID]);
        dev.regmap
            .write_regs(REG_CALIBRATION as usize, &DATASHEET_CALIBRATION);
        // UT = 27898
        dev.regmap.write_regs(REG_OUT_MSB as usize, &[0x6c, 0xfa, 0x00]);
        dev
    }

    #[test]
    fn parses_calibration_words() {
        let cal = datasheet();
        assert_eq!(cal.ac1, 408);
        assert_eq!(cal.ac2, -72);
        assert_eq!(cal.ac3, -14383);
        assert_eq!(cal.ac4, 32741);
        assert_eq!(cal.ac5, 32757);
        assert_eq!(cal.ac6, 23153);
        assert_eq!(cal.b1, 6190);
        assert_eq!(cal.b2, 4);
        assert_eq!(cal.mb, -32768);
        assert_eq!(cal.mc, -8711);
        assert_eq!(cal.md, 2868);
    }

    #[test]
    fn rejects_blank_calibration() {
        let mut data = DATASHEET_CALIBRATION;
        data[6] = 0xff;
        data[7] = 0xff;
        assert!(matches!(
            Calibration::from_bytes(&data),
            Err(Bmp180Error::InvalidCalibration(3))
        ));
        assert!(matches!(
            Calibration::from_bytes(&[0; 22]),
            Err(Bmp180Error::InvalidCalibration(0))
        ));
    }

    #[test]
    fn compensates_datasheet_example() {
        let cal = datasheet();
        let (tenths, b5) = cal.compensate_temperature(27898);
        assert_eq!(tenths, 150);
        assert_eq!(b5, 2400);
        assert_eq!(
            cal.compensate_pressure(23843, b5, Oversampling::UltraLowPower),
            69964
        );
    }

    #[test]
    fn reads_temperature_from_device() {
        let mut bmp = Bmp180::with_device(mock_sensor()).unwrap();
        assert_eq!(bmp.calibration(), &datasheet());
        // B5 = 2400, (2400 + 8) / 160
        assert_eq!(bmp.read_temperature().unwrap(), 15.05);
    }

    #[test]
    fn reads_pressure_from_device() {
        let mut bmp = Bmp180::with_device(mock_sensor())
            .unwrap()
            .with_oversampling(Oversampling::UltraLowPower);
        // the mock shares 0xF6..0xF8 between both conversions, so UP = 27898 too
        let expected = datasheet().compensate_pressure(27898, 2400, Oversampling::UltraLowPower);
        assert_eq!(bmp.read_pressure().unwrap(), f64::from(expected) / 100.0);
    }

    #[test]
    fn compensates_ultra_high_resolution() {
        // datasheet formula by hand: B3 = 3378, B7 = 1171037500, p = 70002 - 39
        assert_eq!(
            datasheet().compensate_pressure(190744, 2400, Oversampling::UltraHighResolution),
            69963
        );
    }

    #[test]
    fn out_of_range_pressure_saturates() {
        let cal = Calibration {
            ac4: 1,
            ..datasheet()
        };
        assert_eq!(
            cal.compensate_pressure(i32::MAX, 2400, Oversampling::UltraLowPower),
            i32::MAX
        );
    }

    fn pressure_with(oversampling: Oversampling, expected_control: u8, raw_shift: u32) {
        let mut dev = mock_sensor();
        // UT stays 27898, the XLSB only feeds the pressure sample
        dev.regmap.write_regs(REG_OUT_MSB as usize, &[0x6c, 0xfa, 0xe0]);
        let mut bmp = Bmp180::with_device(dev)
            .unwrap()
            .with_oversampling(oversampling);

        let up = 0x6cfae0 >> raw_shift;
        let expected = datasheet().compensate_pressure(up, 2400, oversampling);
        assert_eq!(bmp.read_pressure().unwrap(), f64::from(expected) / 100.0);

        let mut control = [0u8; 1];
        read_register(&mut bmp.i2cdev, REG_CONTROL, &mut control).unwrap();
        assert_eq!(control[0], expected_control);
    }

    #[test]
    fn reads_pressure_at_standard_oversampling() {
        pressure_with(Oversampling::Standard, 0x74, 7);
        assert_eq!(0x6cfae0 >> 7, 55797);
    }

    #[test]
    fn reads_pressure_at_ultra_high_resolution() {
        pressure_with(Oversampling::UltraHighResolution, 0xf4, 5);
    }

    #[test]
    fn rejects_other_chips() {
        let mut dev = mock_sensor();
        dev.regmap.write_regs(REG_CHIP_ID as usize, &[0x58]);
        assert!(matches!(
            Bmp180::with_device(dev),
            Err(Bmp180Error::UnexpectedChipId(0x58))
        ));
    }

    #[test]
    fn soft_reset_writes_reset_command() {
        let mut bmp = Bmp180::with_device(mock_sensor()).unwrap();
        bmp.soft_reset().unwrap();
        let mut value = [0u8; 1];
        read_register(&mut bmp.i2cdev, REG_SOFT_RESET, &mut value).unwrap();
        assert_eq!(value[0], CMD_SOFT_RESET);
    }

    #[test]
    fn oversampling_defaults_to_standard() {
        let bmp = Bmp180::with_device(mock_sensor()).unwrap();
        assert_eq!(bmp.oversampling(), Oversampling::Standard);
        assert_eq!(Oversampling::UltraHighResolution.oss(), 3);
    }
}
