use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One control cycle's sensor values.
///
/// Every field is a finite number; out-of-range values are accepted and
/// clamped by the variables that read them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReading")]
pub struct SensorReading {
    indoor_temp: f64,
    outdoor_temp: f64,
    co2: f64,
    lighting: f64,
}

impl SensorReading {
    /// Indoor and outdoor temperatures in °C, CO₂ in ppm, lighting as a percentage.
    pub fn new(indoor_temp: f64, outdoor_temp: f64, co2: f64, lighting: f64) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("indoor_temp", indoor_temp),
            ("outdoor_temp", outdoor_temp),
            ("co2", co2),
            ("lighting", lighting),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field, value });
            }
        }

        Ok(Self {
            indoor_temp,
            outdoor_temp,
            co2,
            lighting,
        })
    }

    pub fn indoor_temp(&self) -> f64 {
        self.indoor_temp
    }

    pub fn outdoor_temp(&self) -> f64 {
        self.outdoor_temp
    }

    pub fn co2(&self) -> f64 {
        self.co2
    }

    pub fn lighting(&self) -> f64 {
        self.lighting
    }
}

/// A reading as it arrives, before validation.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RawReading {
    pub indoor_temp: Option<f64>,
    pub outdoor_temp: Option<f64>,
    pub co2: Option<f64>,
    pub lighting: Option<f64>,
}

impl TryFrom<RawReading> for SensorReading {
    type Error = ValidationError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        SensorReading::new(
            raw.indoor_temp.ok_or(ValidationError::MissingField("indoor_temp"))?,
            raw.outdoor_temp.ok_or(ValidationError::MissingField("outdoor_temp"))?,
            raw.co2.ok_or(ValidationError::MissingField("co2"))?,
            raw.lighting.ok_or(ValidationError::MissingField("lighting"))?,
        )
    }
}

#[test]
fn test_new_rejects_non_finite() {
    assert!(SensorReading::new(21., 12., 400., 60.).is_ok());
    assert_eq!(
        SensorReading::new(21., f64::INFINITY, 400., 60.),
        Err(ValidationError::NotFinite {
            field: "outdoor_temp",
            value: f64::INFINITY
        })
    );
}

#[test]
fn test_try_from_raw() {
    let raw = RawReading {
        indoor_temp: Some(21.),
        outdoor_temp: Some(12.),
        co2: None,
        lighting: Some(60.),
    };

    assert_eq!(SensorReading::try_from(raw), Err(ValidationError::MissingField("co2")));

    let reading = SensorReading::try_from(RawReading { co2: Some(400.), ..raw }).unwrap();

    assert_eq!(reading.co2(), 400.);
    assert_eq!(reading.indoor_temp(), 21.);
}
