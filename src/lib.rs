//! `ruuvitag-decoder` library.
//!
//! Turns captured BLE advertisements into RuuviTag sensor records:
//! [`dispatcher`] finds the Ruuvi payload in the parsed AD structures and
//! [`decoder`] decodes it according to its data format. The binary
//! (`src/main.rs`) reads captured advertisements and prints InfluxDB line
//! protocol; its loop lives in [`app`] where it can be tested with injected
//! input and output streams.
//!
//! ```
//! use ruuvitag_decoder::{RawAdvertisement, identify};
//!
//! let scan_data = vec![
//!     0x02, 0x01, 0x06, 0x11, 0xFF, 0x99, 0x04, 0x03, 0x29, 0x1A, 0x1E, 0xCE, 0x1E, 0xFC,
//!     0x18, 0xF9, 0x42, 0x02, 0xCA, 0x0B, 0x53,
//! ];
//! let record = identify(&RawAdvertisement::new("AA:BB:CC:DD:EE:FF", scan_data, -67)).unwrap();
//! assert_eq!(record.measurement.data_format, 3);
//! assert_eq!(record.measurement.humidity, Some(20.5));
//! ```

pub mod advertisement;
pub mod alias;
pub mod app;
pub mod codec;
pub mod decoder;
pub mod dispatcher;
pub mod input;
pub mod mac_address;
pub mod measurement;
pub mod output;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use advertisement::{AdParser, AdPayloadParser, AdStructure, ParseError, RawAdvertisement};
pub use alias::{Alias, AliasMap, parse_alias, resolve_name, to_map};
pub use decoder::{CanonicalInput, DataFormat, DecodeError, PROTOCOL_OFFSET, decode, try_decode};
pub use dispatcher::{Dispatcher, RUUVI_MANUFACTURER_ID, identify};
pub use input::{AdvertisementSource, InputError, LineSource};
pub use mac_address::MacAddress;
pub use measurement::{Measurement, SensorRecord};
pub use output::OutputFormatter;
pub use output::influxdb::InfluxDbFormatter;
