use chrono::{DateTime, Utc};
use sylvia_iot_sdk::util::strings;

pub mod config;
pub mod device_log;

/// One temperature reading reported by a device. Values are kept as the raw form text.
#[derive(Clone, Debug)]
pub struct Reading {
    pub device_id: String,
    pub temperature: String,
    pub received_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(device_id: &str, temperature: &str, received_at: DateTime<Utc>) -> Self {
        Reading {
            device_id: device_id.to_string(),
            temperature: temperature.to_string(),
            received_at,
        }
    }

    /// The timestamp string used in both the CSV line and the response body.
    pub fn time_str(&self) -> String {
        strings::time_str(&self.received_at)
    }

    /// The CSV line `<timestamp>, <temperature>\n`.
    pub fn to_csv_line(&self) -> String {
        format!("{}, {}\n", self.time_str(), self.temperature)
    }
}
