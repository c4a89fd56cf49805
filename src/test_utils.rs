//! Shared fixtures for unit tests.
//!
//! Payload vectors are the reference vectors published with the Ruuvi sensor
//! protocol documentation, starting at the format byte.

use crate::advertisement::{AD_TYPE_MANUFACTURER_DATA, AD_TYPE_SERVICE_DATA_16};
use crate::measurement::{Measurement, SensorRecord};

/// A stable device address for unit tests.
pub const TEST_ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

pub const FORMAT_3: [u8; 14] = [
    0x03, 0x29, 0x1A, 0x1E, 0xCE, 0x1E, 0xFC, 0x18, 0xF9, 0x42, 0x02, 0xCA, 0x0B, 0x53,
];

pub const FORMAT_5_VALID: [u8; 24] = [
    0x05, // Format 5
    0x12, 0xFC, // Temperature: 24.30 C
    0x53, 0x94, // Humidity: 53.49 %
    0xC3, 0x7C, // Pressure: 100044 Pa
    0x00, 0x04, // Acceleration X: 4 mG
    0xFF, 0xFC, // Acceleration Y: -4 mG
    0x04, 0x0C, // Acceleration Z: 1036 mG
    0xAC, 0x36, // Battery: 2977 mV, TX Power: 4 dBm
    0x42, // Movement counter: 66
    0x00, 0xCD, // Sequence: 205
    0xCB, 0xB8, 0x33, 0x4C, 0x88, 0x4F, // MAC address
];

pub const FORMAT_5_MAX: [u8; 24] = [
    0x05, 0x7F, 0xFF, 0xFF, 0xFE, 0xFF, 0xFE, 0x7F, 0xFF, 0x7F, 0xFF, 0x7F, 0xFF, 0xFF, 0xDE, 0xFE,
    0xFF, 0xFE, 0xCB, 0xB8, 0x33, 0x4C, 0x88, 0x4F,
];

pub const FORMAT_5_MIN: [u8; 24] = [
    0x05, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00, 0x80, 0x01, 0x80, 0x01, 0x80, 0x01, 0x00, 0x00, 0x00,
    0x00, 0x00, 0xCB, 0xB8, 0x33, 0x4C, 0x88, 0x4F,
];

pub const FORMAT_5_INVALID: [u8; 24] = [
    0x05, 0x80, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Encode a single manufacturer specific AD structure.
pub fn manufacturer_structure(company_id: u16, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![(payload.len() + 3) as u8, AD_TYPE_MANUFACTURER_DATA];
    data.extend_from_slice(&company_id.to_le_bytes());
    data.extend_from_slice(payload);
    data
}

/// A RuuviTag advertisement: flags followed by Ruuvi manufacturer data, so
/// the format byte of `payload` lands at the protocol offset.
pub fn ruuvi_scan_data(payload: &[u8]) -> Vec<u8> {
    let mut data = vec![0x02, 0x01, 0x06];
    data.extend(manufacturer_structure(0x0499, payload));
    data
}

/// Encode an Eddystone-URL service data structure.
pub fn eddystone_url_structure(scheme: u8, encoded_url: &[u8]) -> Vec<u8> {
    let mut data = vec![
        (encoded_url.len() + 6) as u8,
        AD_TYPE_SERVICE_DATA_16,
        0xAA,
        0xFE,
        0x10, // URL frame
        0xC3, // TX power at 0 m
        scheme,
    ];
    data.extend_from_slice(encoded_url);
    data
}

/// Build a `SensorRecord` around a measurement with only `temperature` set.
pub fn base_record(id: &str, temperature: f64) -> SensorRecord {
    SensorRecord {
        id: id.to_string(),
        url: None,
        signal_strength: -70,
        measurement: Measurement {
            temperature: Some(temperature),
            ..Measurement::new(5)
        },
    }
}
