//! Data format 5 (RAWv2) decoder.
//!
//! Every field has a reserved "not available" value which decodes to `None`.

use super::{DataFormat, DecodeError, payload};
use crate::mac_address::MacAddress;
use crate::measurement::Measurement;

/// Payload length including the format byte and trailing MAC address.
pub const PAYLOAD_LENGTH: usize = 24;

const BATTERY_UNAVAILABLE: u16 = 0x7FF;
const TX_POWER_UNAVAILABLE: u16 = 0x1F;
const MAC_UNAVAILABLE: [u8; 6] = [0xFF; 6];

pub fn decode(data: &[u8], offset: usize) -> Result<Measurement, DecodeError> {
    let p: &[u8; PAYLOAD_LENGTH] = payload(data, offset, DataFormat::V5)?;

    let i16_at = |i: usize| i16::from_be_bytes([p[i], p[i + 1]]);
    let u16_at = |i: usize| u16::from_be_bytes([p[i], p[i + 1]]);

    let temperature = Some(i16_at(1))
        .filter(|&raw| raw != i16::MIN)
        .map(|raw| f64::from(raw) * 0.005);
    let humidity = Some(u16_at(3))
        .filter(|&raw| raw != u16::MAX)
        .map(|raw| f64::from(raw) * 0.0025);
    let pressure = Some(u16_at(5))
        .filter(|&raw| raw != u16::MAX)
        .map(|raw| f64::from(raw) + 50_000.0);

    let acceleration = match (i16_at(7), i16_at(9), i16_at(11)) {
        (i16::MIN, _, _) | (_, i16::MIN, _) | (_, _, i16::MIN) => None,
        (x, y, z) => Some((
            f64::from(x) / 1000.0,
            f64::from(y) / 1000.0,
            f64::from(z) / 1000.0,
        )),
    };

    // 11 bits battery above 1600 mV, 5 bits TX power in 2 dBm steps above -40 dBm
    let power = u16_at(13);
    let battery = Some(power >> 5)
        .filter(|&raw| raw != BATTERY_UNAVAILABLE)
        .map(|raw| f64::from(raw + 1600) / 1000.0);
    let tx_power = Some(power & 0x1F)
        .filter(|&raw| raw != TX_POWER_UNAVAILABLE)
        .map(|raw| raw as i8 * 2 - 40);

    let movement_counter = Some(p[15]).filter(|&raw| raw != u8::MAX).map(u32::from);
    let measurement_sequence = Some(u16_at(16))
        .filter(|&raw| raw != u16::MAX)
        .map(u32::from);
    let mac = MacAddress::from_slice(&p[18..]).filter(|mac| mac.0 != MAC_UNAVAILABLE);

    Ok(Measurement {
        data_format: p[0],
        temperature,
        humidity,
        pressure,
        battery,
        tx_power,
        movement_counter,
        measurement_sequence,
        acceleration,
        mac,
    })
}
