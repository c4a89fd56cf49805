//! Data format 3 (RAWv1) decoder.
//!
//! Layout after the format byte: humidity (0.5 %), temperature as sign and
//! magnitude integer plus hundredths, pressure offset by 50000 Pa,
//! acceleration in mg and battery voltage in mV. All multi-byte fields are
//! big-endian.

use super::{DataFormat, DecodeError, payload};
use crate::measurement::Measurement;

/// Payload length including the format byte.
pub const PAYLOAD_LENGTH: usize = 14;

pub fn decode(data: &[u8], offset: usize) -> Result<Measurement, DecodeError> {
    let p: &[u8; PAYLOAD_LENGTH] = payload(data, offset, DataFormat::V3)?;

    let acceleration_axis = |i: usize| f64::from(i16::from_be_bytes([p[i], p[i + 1]])) / 1000.0;

    Ok(Measurement {
        temperature: Some(temperature(p[2], p[3])),
        humidity: Some(f64::from(p[1]) * 0.5),
        pressure: Some(f64::from(u16::from_be_bytes([p[4], p[5]])) + 50_000.0),
        acceleration: Some((
            acceleration_axis(6),
            acceleration_axis(8),
            acceleration_axis(10),
        )),
        battery: Some(f64::from(u16::from_be_bytes([p[12], p[13]])) / 1000.0),
        ..Measurement::new(p[0])
    })
}

fn temperature(integer: u8, hundredths: u8) -> f64 {
    let magnitude = f64::from(integer & 0x7F) + f64::from(hundredths) / 100.0;
    if integer & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}
