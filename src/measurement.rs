//! Decoded RuuviTag values and the record handed back to callers.

use crate::mac_address::MacAddress;

/// Sensor values decoded from one RuuviTag payload.
///
/// All values are in standard SI units:
/// - Temperature in Celsius
/// - Humidity in percent (0-100)
/// - Pressure in Pascals
/// - Battery voltage in Volts
/// - TX power in dBm
/// - Acceleration in g (standard gravity)
///
/// Fields a format does not carry, or marks as unavailable, are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    /// Data format the payload was decoded from (2, 3, 4 or 5)
    pub data_format: u8,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Atmospheric pressure in Pascals
    pub pressure: Option<f64>,
    /// Battery voltage in Volts
    pub battery: Option<f64>,
    /// TX power in dBm
    pub tx_power: Option<i8>,
    /// Movement counter
    pub movement_counter: Option<u32>,
    /// Measurement sequence number
    pub measurement_sequence: Option<u32>,
    /// Acceleration vector (x, y, z) in g
    pub acceleration: Option<(f64, f64, f64)>,
    /// MAC address broadcast inside the payload
    pub mac: Option<MacAddress>,
}

impl Measurement {
    /// An empty measurement for `data_format`.
    pub fn new(data_format: u8) -> Self {
        Self {
            data_format,
            ..Self::default()
        }
    }
}

/// A decoded advertisement: the measurement plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// Address of the advertising device
    pub id: String,
    /// Eddystone URL the payload was read from, for URL-carried formats
    pub url: Option<String>,
    /// Received signal strength in dBm
    pub signal_strength: i32,
    pub measurement: Measurement,
}
