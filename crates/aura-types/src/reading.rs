use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The four numeric sensor aggregates carried by every health event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Beats per minute.
    pub heart_rate: f64,
    /// Breaths per minute.
    pub respiratory_rate: f64,
    /// Body temperature in degrees Celsius.
    pub temperature: f64,
    /// Blood oxygen saturation, percent.
    pub spo2: f64,
}

impl SensorReading {
    pub fn new(heart_rate: f64, respiratory_rate: f64, temperature: f64, spo2: f64) -> Self {
        Self {
            heart_rate,
            respiratory_rate,
            temperature,
            spo2,
        }
    }

    /// All-zero reading, as carried by the genesis entry.
    pub const fn zero() -> Self {
        Self {
            heart_rate: 0.0,
            respiratory_rate: 0.0,
            temperature: 0.0,
            spo2: 0.0,
        }
    }

    /// Build a reading from optional fields, failing on the first missing one.
    pub fn from_parts(
        heart_rate: Option<f64>,
        respiratory_rate: Option<f64>,
        temperature: Option<f64>,
        spo2: Option<f64>,
    ) -> Result<Self, TypeError> {
        let reading = Self {
            heart_rate: heart_rate.ok_or(TypeError::MissingField("heartRate"))?,
            respiratory_rate: respiratory_rate
                .ok_or(TypeError::MissingField("respiratoryRate"))?,
            temperature: temperature.ok_or(TypeError::MissingField("temperature"))?,
            spo2: spo2.ok_or(TypeError::MissingField("spo2"))?,
        };
        reading.validate()?;
        Ok(reading)
    }

    /// Reject NaN and infinite values. Canonical serialization cannot
    /// represent them.
    pub fn validate(&self) -> Result<(), TypeError> {
        for (field, value) in [
            ("heartRate", self.heart_rate),
            ("respiratoryRate", self.respiratory_rate),
            ("temperature", self.temperature),
            ("spo2", self.spo2),
        ] {
            if !value.is_finite() {
                return Err(TypeError::NonFinite { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_requires_every_field() {
        let err = SensorReading::from_parts(Some(80.0), None, Some(36.6), Some(98.0))
            .unwrap_err();
        assert_eq!(err, TypeError::MissingField("respiratoryRate"));

        let err = SensorReading::from_parts(Some(80.0), Some(16.0), Some(36.6), None)
            .unwrap_err();
        assert_eq!(err, TypeError::MissingField("spo2"));
    }

    #[test]
    fn from_parts_accepts_complete_reading() {
        let reading =
            SensorReading::from_parts(Some(80.0), Some(16.0), Some(36.6), Some(98.0)).unwrap();
        assert_eq!(reading, SensorReading::new(80.0, 16.0, 36.6, 98.0));
    }

    #[test]
    fn non_finite_values_rejected() {
        let reading = SensorReading::new(f64::NAN, 16.0, 36.6, 98.0);
        assert_eq!(
            reading.validate().unwrap_err(),
            TypeError::NonFinite { field: "heartRate" }
        );
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(SensorReading::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["heartRate"], 1.0);
        assert_eq!(json["respiratoryRate"], 2.0);
        assert_eq!(json["spo2"], 4.0);
    }
}
