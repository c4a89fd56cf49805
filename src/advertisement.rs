//! BLE advertisement input types and AD structure parsing.
//!
//! The dispatcher only needs a handful of structure kinds, so parsed
//! structures are modelled as a closed enum. The parser sits behind the
//! [`AdParser`] trait so that callers with their own Bluetooth stack can
//! hand over structures they already parsed.

use thiserror::Error;

/// AD type for manufacturer specific data.
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// AD type for service data with a 16-bit UUID.
pub const AD_TYPE_SERVICE_DATA_16: u8 = 0x16;

/// Eddystone service UUID.
pub const EDDYSTONE_UUID: u16 = 0xFEAA;

/// Eddystone frame type for URL frames.
pub const EDDYSTONE_URL_FRAME: u8 = 0x10;

const URL_SCHEMES: [&str; 4] = ["http://www.", "https://www.", "http://", "https://"];

const URL_EXPANSIONS: [&str; 14] = [
    ".com/", ".org/", ".edu/", ".net/", ".info/", ".biz/", ".gov/", ".com", ".org", ".edu", ".net",
    ".info", ".biz", ".gov",
];

/// A captured BLE advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAdvertisement {
    /// Address of the advertising device (e.g. "AA:BB:CC:DD:EE:FF")
    pub device_address: String,
    /// Advertising payload as received from the controller
    pub scan_data: Vec<u8>,
    /// Received signal strength in dBm
    pub signal_strength: i32,
}

impl RawAdvertisement {
    pub fn new(device_address: impl Into<String>, scan_data: Vec<u8>, signal_strength: i32) -> Self {
        Self {
            device_address: device_address.into(),
            scan_data,
            signal_strength,
        }
    }
}

/// A typed AD structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdStructure {
    /// Eddystone-URL frame with its expanded URL
    Url { url: String },
    /// Manufacturer specific data (company id and the bytes following it)
    Manufacturer { company_id: u16, payload: Vec<u8> },
    /// Any structure the dispatcher has no use for
    Other { ad_type: u8 },
}

/// Errors returned when an advertising payload cannot be split into structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("AD structure at offset {offset} declares {length} bytes, only {available} available")]
    Truncated {
        offset: usize,
        length: usize,
        available: usize,
    },
}

/// Splits an advertising payload into typed AD structures.
pub trait AdParser: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<Vec<AdStructure>, ParseError>;
}

/// Default parser for length-prefixed AD structures.
///
/// Recognizes manufacturer specific data and Eddystone-URL frames; every
/// other structure is reported as [`AdStructure::Other`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AdPayloadParser;

impl AdParser for AdPayloadParser {
    fn parse(&self, data: &[u8]) -> Result<Vec<AdStructure>, ParseError> {
        let mut structures = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            let len = usize::from(data[offset]);
            // Zero length terminates the significant part
            if len == 0 {
                break;
            }

            let available = data.len() - offset - 1;
            if len > available {
                return Err(ParseError::Truncated {
                    offset,
                    length: len,
                    available,
                });
            }

            let ad_type = data[offset + 1];
            let body = &data[offset + 2..offset + 1 + len];
            structures.push(parse_structure(ad_type, body));

            offset += 1 + len;
        }

        Ok(structures)
    }
}

fn parse_structure(ad_type: u8, body: &[u8]) -> AdStructure {
    match ad_type {
        AD_TYPE_MANUFACTURER_DATA if body.len() >= 2 => AdStructure::Manufacturer {
            company_id: u16::from_le_bytes([body[0], body[1]]),
            payload: body[2..].to_vec(),
        },
        AD_TYPE_SERVICE_DATA_16 => match parse_eddystone_url(body) {
            Some(url) => AdStructure::Url { url },
            None => AdStructure::Other { ad_type },
        },
        _ => AdStructure::Other { ad_type },
    }
}

/// Expand an Eddystone-URL service data body into a URL string.
///
/// Layout: UUID (2, little-endian), frame type, TX power, scheme prefix,
/// encoded URL.
fn parse_eddystone_url(body: &[u8]) -> Option<String> {
    let [uuid_lo, uuid_hi, frame_type, _tx_power, scheme, encoded @ ..] = body else {
        return None;
    };
    if u16::from_le_bytes([*uuid_lo, *uuid_hi]) != EDDYSTONE_UUID
        || *frame_type != EDDYSTONE_URL_FRAME
    {
        return None;
    }

    let mut url = String::from(*URL_SCHEMES.get(usize::from(*scheme))?);
    for &byte in encoded {
        match byte {
            0x00..=0x0D => url.push_str(URL_EXPANSIONS[usize::from(byte)]),
            0x21..=0x7E => url.push(char::from(byte)),
            _ => return None,
        }
    }
    Some(url)
}
