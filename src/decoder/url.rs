//! Data formats 2 and 4, carried base64 encoded in an Eddystone URL.
//!
//! Format 4 appends a random tag id after the pressure field. The id rarely
//! survives the URL length limit, so both formats decode the same six bytes.

use super::{DataFormat, DecodeError, payload};
use crate::measurement::Measurement;

/// Payload length including the format byte.
pub const PAYLOAD_LENGTH: usize = 6;

pub fn decode(data: &[u8], offset: usize) -> Result<Measurement, DecodeError> {
    let p: &[u8; PAYLOAD_LENGTH] = payload(data, offset, DataFormat::Url)?;

    let raw_temperature = u16::from_be_bytes([p[2], p[3]]);
    let magnitude = f64::from(raw_temperature & 0x7FFF) / 256.0;
    let temperature = if raw_temperature & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Measurement {
        temperature: Some(temperature),
        humidity: Some(f64::from(p[1]) * 0.5),
        pressure: Some(f64::from(u16::from_be_bytes([p[4], p[5]])) + 50_000.0),
        ..Measurement::new(p[0])
    })
}
