//! Compact binary frame for sensor readings.
//!
//! The 20 bytes frame:
//!
//! | bytes | field                                                   |
//! |-------|---------------------------------------------------------|
//! | 0     | data format (`0x00`)                                    |
//! | 1     | reserved (`0x00`)                                       |
//! | 2-3   | obfuscation key                                         |
//! | 4-5   | payload size (`6`), masked                              |
//! | 6-7   | device ID, masked                                       |
//! | 8-9   | temperature in 0.1 Celsius (signed), masked             |
//! | 10-11 | humidity in 0.1% (unsigned), masked                     |
//! | 12-19 | the first 8 bytes of SHA-256 of bytes 2-11              |
//!
//! All multi-byte fields are big-endian. A masked field is XORed with the obfuscation key. The
//! frame is transported as 27 characters of base64url without padding (RFC 4648 section 5).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use log::debug;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::SensorReading;

pub const FRAME_LEN: usize = 20;
pub const ENCODED_LEN: usize = 27;
pub const FORMAT_V0: u8 = 0x00;
pub const DEF_KEY: u16 = 0x1234;
/// Size of the device ID, temperature and humidity fields.
pub const PAYLOAD_SIZE: u16 = 6;

const HASH_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid base64url text: {0}")]
    InvalidEncoding(String),
    #[error("invalid frame length {0}, expect 20")]
    InvalidLength(usize),
    #[error("unsupported data format {0:#04x}")]
    UnsupportedFormat(u8),
    #[error("corrupt frame: hash mismatch")]
    Corrupt,
    #[error("payload size {0} mismatch, expect 6")]
    SizeMismatch(u16),
}

/// A sensor reading with the obfuscation key used to mask it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorFrame {
    pub key: u16,
    pub reading: SensorReading,
}

impl SensorFrame {
    /// Uses the default obfuscation key [`DEF_KEY`].
    pub fn new(reading: SensorReading) -> Self {
        SensorFrame::with_key(reading, DEF_KEY)
    }

    /// Key `0` leaves fields unmasked.
    pub fn with_key(reading: SensorReading, key: u16) -> Self {
        SensorFrame { key, reading }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = FORMAT_V0;
        buf[1] = 0x00;
        buf[2..4].copy_from_slice(&self.key.to_be_bytes());
        buf[4..6].copy_from_slice(&(PAYLOAD_SIZE ^ self.key).to_be_bytes());
        buf[6..8].copy_from_slice(&(self.reading.device_id ^ self.key).to_be_bytes());
        buf[8..10].copy_from_slice(&(self.reading.temperature as u16 ^ self.key).to_be_bytes());
        buf[10..12].copy_from_slice(&(self.reading.humidity ^ self.key).to_be_bytes());
        let hash = digest(&buf[2..12]);
        buf[12..FRAME_LEN].copy_from_slice(&hash);
        buf
    }

    /// Parses raw frame bytes. The hash is verified before any masked field is read.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        const FN_NAME: &'static str = "SensorFrame::from_bytes";

        if data.len() != FRAME_LEN {
            return Err(FrameError::InvalidLength(data.len()));
        } else if data[0] != FORMAT_V0 {
            return Err(FrameError::UnsupportedFormat(data[0]));
        }
        if digest(&data[2..12]) != data[12..FRAME_LEN] {
            debug!("[{}] hash mismatch for {}", FN_NAME, hex::encode(data));
            return Err(FrameError::Corrupt);
        }

        let key = read_u16(data, 2);
        let size = read_u16(data, 4) ^ key;
        if size != PAYLOAD_SIZE {
            return Err(FrameError::SizeMismatch(size));
        }

        Ok(SensorFrame {
            key,
            reading: SensorReading {
                device_id: read_u16(data, 6) ^ key,
                temperature: (read_u16(data, 8) ^ key) as i16,
                humidity: read_u16(data, 10) ^ key,
            },
        })
    }

    /// To base64url text of [`ENCODED_LEN`] characters.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_bytes())
    }

    pub fn decode(text: &str) -> Result<Self, FrameError> {
        if text.len() != ENCODED_LEN {
            return Err(FrameError::InvalidEncoding(format!(
                "length {}, expect {}",
                text.len(),
                ENCODED_LEN
            )));
        }
        let data = match URL_SAFE_NO_PAD.decode(text) {
            Err(e) => return Err(FrameError::InvalidEncoding(e.to_string())),
            Ok(data) => data,
        };
        SensorFrame::from_bytes(data.as_slice())
    }
}

/// To encode a reading with the default obfuscation key.
pub fn encode(device_id: u16, temperature: i16, humidity: u16) -> String {
    SensorFrame::new(SensorReading::new(device_id, temperature, humidity)).encode()
}

/// To decode base64url text into the reading it carries.
pub fn decode(text: &str) -> Result<SensorReading, FrameError> {
    Ok(SensorFrame::decode(text)?.reading)
}

fn digest(data: &[u8]) -> [u8; HASH_LEN] {
    let hash = Sha256::digest(data);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&hash[..HASH_LEN]);
    out
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}
