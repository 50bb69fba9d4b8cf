//! AM2320 temperature and humidity sensor response parsing.
//!
//! A read of registers `0x00`-`0x03` (function code `0x03`) is answered with 8 bytes:
//! - function code `0x03`
//! - data size `0x04`
//! - humidity (MSB, LSB) in 0.1%
//! - temperature (MSB, LSB) in 0.1 Celsius. Bit 15 is the sign and the rest is the magnitude.
//! - CRC-16/MODBUS of the first 6 bytes (LSB, MSB)

use thiserror::Error;

use super::SensorReading;

pub const FUNC_READ: u8 = 0x03;
pub const READ_SIZE: u8 = 0x04;
pub const RESP_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Am2320Error {
    #[error("invalid response length {0}, expect 8")]
    InvalidLength(usize),
    #[error("function code {0:#04x} mismatch")]
    FunctionCodeMismatch(u8),
    #[error("data size {0} mismatch")]
    DataSizeMismatch(u8),
    #[error("CRC {actual:#06x} mismatch, expect {expect:#06x}")]
    CrcMismatch { actual: u16, expect: u16 },
}

/// Values from one AM2320 response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Am2320Reading {
    /// 0.1 Celsius. -400 to 850.
    pub temperature: i16,
    /// 0.1%. 0 to 1000.
    pub humidity: u16,
}

impl Am2320Reading {
    pub fn into_reading(self, device_id: u16) -> SensorReading {
        SensorReading::new(device_id, self.temperature, self.humidity)
    }
}

/// CRC-16/MODBUS.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xffff;
    for b in data {
        crc ^= *b as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xa001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

pub fn parse_response(data: &[u8]) -> Result<Am2320Reading, Am2320Error> {
    if data.len() != RESP_LEN {
        return Err(Am2320Error::InvalidLength(data.len()));
    } else if data[0] != FUNC_READ {
        return Err(Am2320Error::FunctionCodeMismatch(data[0]));
    } else if data[1] != READ_SIZE {
        return Err(Am2320Error::DataSizeMismatch(data[1]));
    }
    let actual = u16::from_le_bytes([data[6], data[7]]);
    let expect = crc16(&data[0..6]);
    if actual != expect {
        return Err(Am2320Error::CrcMismatch { actual, expect });
    }

    let humidity = u16::from_be_bytes([data[2], data[3]]);
    let raw_temp = u16::from_be_bytes([data[4], data[5]]);
    let temperature = match raw_temp & 0x8000 {
        0 => raw_temp as i16,
        _ => -((raw_temp & 0x7fff) as i16),
    };
    Ok(Am2320Reading {
        temperature,
        humidity,
    })
}
