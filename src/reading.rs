// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading and report records.
//!
//! A [`Reading`] carries one measured quantity with its unit and display
//! category. The unit and category are derived from the [`Kind`], so a
//! temperature is always reported in `celsius` and a pressure in `hpa`.

use serde::{Deserialize, Serialize};

/// What was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Temperature,
    Pressure,
}

/// Unit paired with a reading value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Celsius,
    Hpa,
}

/// Category label for downstream consumers, serialized capitalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessoryType {
    Temperature,
    Pressure,
}

impl Kind {
    /// Unit every reading of this kind is reported in
    pub fn unit(self) -> Unit {
        match self {
            Kind::Temperature => Unit::Celsius,
            Kind::Pressure => Unit::Hpa,
        }
    }

    /// Display category for this kind
    pub fn accessory_type(self) -> AccessoryType {
        match self {
            Kind::Temperature => AccessoryType::Temperature,
            Kind::Pressure => AccessoryType::Pressure,
        }
    }
}

/// A single reportable measurement.
/// Field order is the order of the emitted JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub unit: Unit,
    pub value: f64,
    pub kind: Kind,
    pub accessory_type: AccessoryType,
}

impl Reading {
    /// Reading of `kind`, unit and category filled in from the kind
    pub fn new(kind: Kind, value: f64) -> Self {
        Reading {
            unit: kind.unit(),
            value,
            kind,
            accessory_type: kind.accessory_type(),
        }
    }

    /// Temperature reading in Celsius
    pub fn temperature(celsius: f64) -> Self {
        Reading::new(Kind::Temperature, celsius)
    }

    /// Pressure reading in hectopascal
    pub fn pressure(hpa: f64) -> Self {
        Reading::new(Kind::Pressure, hpa)
    }
}

/// The two scalars produced by one acquisition pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Degrees Celsius
    pub temperature: f64,
    /// Hectopascal
    pub pressure: f64,
}

/// Ordered readings of one acquisition pass, serialized as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(Vec<Reading>);

impl Report {
    /// Builds the report, temperature first, then pressure.
    /// Values are copied as is, NaN and infinities included.
    pub fn from_measurements(m: Measurements) -> Self {
        Report(vec![
            Reading::temperature(m.temperature),
            Reading::pressure(m.pressure),
        ])
    }

    /// Readings in report order
    pub fn readings(&self) -> &[Reading] {
        &self.0
    }
}

impl From<Vec<Reading>> for Report {
    fn from(readings: Vec<Reading>) -> Self {
        Report(readings)
    }
}
