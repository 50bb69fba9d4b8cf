use serde::{Deserialize, Serialize};

pub mod am2320;
pub mod frame;

/// One sensor sample as carried by a [`frame::SensorFrame`].
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    #[serde(rename = "deviceId")]
    pub device_id: u16,
    /// Temperature in 0.1 Celsius.
    pub temperature: i16,
    /// Relative humidity in 0.1%.
    pub humidity: u16,
}

impl SensorReading {
    pub fn new(device_id: u16, temperature: i16, humidity: u16) -> Self {
        SensorReading {
            device_id,
            temperature,
            humidity,
        }
    }

    /// Temperature in Celsius.
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 10.0
    }

    /// Relative humidity in percent.
    pub fn humidity_percent(&self) -> f32 {
        self.humidity as f32 / 10.0
    }
}
