// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::Result;
use crate::reading::Report;
use std::io::{self, Write};
use tracing::debug;

/// Serializes the report to compact JSON, no trailing newline.
///
/// Numbers use the shortest representation that round-trips.
/// NaN and infinities become `null`.
pub fn to_json(report: &Report) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(report)?)
}

/// Writes the report to `out` in one write.
///
/// The document is encoded in memory first, so a serialization
/// failure leaves `out` untouched.
pub fn emit<W: Write>(report: &Report, mut out: W) -> Result<()> {
    let document = to_json(report)?;
    debug!(bytes = document.len(), "emitting report");
    out.write_all(&document)?;
    out.flush()?;
    Ok(())
}

/// Writes the report to standard output
pub fn emit_stdout(report: &Report) -> Result<()> {
    emit(report, io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{Measurements, Reading};

    fn nominal() -> Report {
        Report::from_measurements(Measurements {
            temperature: 22.5,
            pressure: 1013.25,
        })
    }

    #[test]
    fn emits_nominal_document() {
        let mut out = Vec::new();
        emit(&nominal(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"unit":"celsius","value":22.5,"kind":"temperature","accessory_type":"Temperature"},{"unit":"hpa","value":1013.25,"kind":"pressure","accessory_type":"Pressure"}]"#
        );
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(to_json(&nominal()).unwrap(), to_json(&nominal()).unwrap());
    }

    #[test]
    fn non_finite_values_become_null() {
        let report = Report::from_measurements(Measurements {
            temperature: f64::NAN,
            pressure: f64::NEG_INFINITY,
        });
        let json = String::from_utf8(to_json(&report).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"unit":"celsius","value":null,"kind":"temperature","accessory_type":"Temperature"},{"unit":"hpa","value":null,"kind":"pressure","accessory_type":"Pressure"}]"#
        );
    }

    #[test]
    fn serializes_any_number_of_readings() {
        let empty = Report::from(Vec::new());
        assert_eq!(to_json(&empty).unwrap(), b"[]");

        let single = Report::from(vec![Reading::pressure(0.0)]);
        assert_eq!(
            to_json(&single).unwrap(),
            br#"[{"unit":"hpa","value":0.0,"kind":"pressure","accessory_type":"Pressure"}]"#
        );
    }

    #[test]
    fn round_trips_through_json() {
        let report = Report::from_measurements(Measurements {
            temperature: -12.75,
            pressure: 987.6,
        });
        let parsed: Report = serde_json::from_slice(&to_json(&report).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        assert!(matches!(
            emit(&nominal(), BrokenPipe),
            Err(crate::Error::Write(_))
        ));
    }
}
