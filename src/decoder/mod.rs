//! RuuviTag payload decoders.
//!
//! Each data format has a pure decoder taking the payload buffer and the
//! offset of its format byte. [`decode`] picks the decoder for a
//! [`CanonicalInput`] and stamps the device id, URL and signal strength onto
//! the result.

pub mod format3;
pub mod format5;
pub mod url;

use crate::advertisement::ParseError;
use crate::codec;
use crate::measurement::{Measurement, SensorRecord};
use log::{debug, error};
use std::fmt;
use thiserror::Error;

/// Offset of the data format byte in a raw advertisement carrying
/// manufacturer data (flags structure, length, type, company id).
pub const PROTOCOL_OFFSET: usize = 7;

/// Offset of the data format byte in a payload recovered from a URL fragment.
pub const URL_PAYLOAD_OFFSET: usize = 0;

/// Error types for decoding RuuviTag advertisements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The advertising payload could not be split into AD structures
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// No Ruuvi URL or Ruuvi manufacturer data in the advertisement
    #[error("No RuuviTag data in advertisement")]
    NoRuuviData,
    /// Neither a URL fragment nor raw data to decode
    #[error("Missing payload")]
    MissingPayload,
    /// Raw data ends before the protocol version byte
    #[error("Raw data has {0} bytes, protocol version is at offset {offset}", offset = PROTOCOL_OFFSET)]
    MissingVersion(usize),
    /// Data format with no decoder
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(u8),
    /// Payload shorter than its format requires
    #[error("{format} payload needs {expected} bytes, got {actual}")]
    TooShort {
        format: DataFormat,
        expected: usize,
        actual: usize,
    },
}

/// Signature shared by all format decoders.
pub type DecodeFn = fn(&[u8], usize) -> Result<Measurement, DecodeError>;

/// Known RuuviTag data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Formats 2 and 4, carried base64 encoded in an Eddystone URL
    Url,
    /// Format 3 (RAWv1)
    V3,
    /// Format 5 (RAWv2)
    V5,
}

impl DataFormat {
    /// Select the format for a protocol version read from raw data.
    ///
    /// URL formats are never selected this way.
    pub fn from_version(version: u8) -> Option<Self> {
        match version {
            3 => Some(Self::V3),
            5 => Some(Self::V5),
            _ => None,
        }
    }

    /// Format byte values accepted by this format's decoder.
    pub fn versions(self) -> &'static [u8] {
        match self {
            Self::Url => &[2, 4],
            Self::V3 => &[3],
            Self::V5 => &[5],
        }
    }

    pub fn decoder(self) -> DecodeFn {
        match self {
            Self::Url => url::decode,
            Self::V3 => format3::decode,
            Self::V5 => format5::decode,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => write!(f, "URL format"),
            Self::V3 => write!(f, "Format 3"),
            Self::V5 => write!(f, "Format 5"),
        }
    }
}

/// Borrow the `N` payload bytes starting at the format byte at `offset`.
///
/// Fails when the format byte is not one of `format`'s versions or the
/// buffer ends early.
pub(crate) fn payload<const N: usize>(
    data: &[u8],
    offset: usize,
    format: DataFormat,
) -> Result<&[u8; N], DecodeError> {
    let rest = data.get(offset..).unwrap_or_default();
    let too_short = || DecodeError::TooShort {
        format,
        expected: N,
        actual: rest.len(),
    };

    let version = *rest.first().ok_or_else(too_short)?;
    if !format.versions().contains(&version) {
        return Err(DecodeError::UnsupportedFormat(version));
    }

    rest.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(too_short)
}

/// Decoder input assembled from one advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalInput<'a> {
    /// Device address
    pub id: &'a str,
    /// Eddystone URL carrying a base64 payload after `#`
    pub url: Option<&'a str>,
    /// Entire advertising payload holding manufacturer data
    pub raw_data: Option<&'a [u8]>,
    pub signal_strength: i32,
}

impl<'a> CanonicalInput<'a> {
    pub fn from_url(id: &'a str, url: &'a str, signal_strength: i32) -> Self {
        Self {
            id,
            url: Some(url),
            raw_data: None,
            signal_strength,
        }
    }

    pub fn from_raw(id: &'a str, raw_data: &'a [u8], signal_strength: i32) -> Self {
        Self {
            id,
            url: None,
            raw_data: Some(raw_data),
            signal_strength,
        }
    }
}

/// Decode an input, reporting why nothing could be decoded.
///
/// A URL containing `#` is decoded as a URL format payload. Otherwise the
/// byte at [`PROTOCOL_OFFSET`] of the raw data selects the decoder.
pub fn try_decode(input: &CanonicalInput<'_>) -> Result<SensorRecord, DecodeError> {
    let fragment = input
        .url
        .and_then(|url| url.split_once('#'))
        .map(|(_, fragment)| fragment);

    let measurement = if let Some(fragment) = fragment {
        let bytes = codec::decode(fragment);
        DataFormat::Url.decoder()(&bytes, URL_PAYLOAD_OFFSET)?
    } else if let Some(raw) = input.raw_data {
        let version = *raw
            .get(PROTOCOL_OFFSET)
            .ok_or(DecodeError::MissingVersion(raw.len()))?;
        let format = DataFormat::from_version(version).ok_or(DecodeError::UnsupportedFormat(version))?;
        format.decoder()(raw, PROTOCOL_OFFSET)?
    } else {
        return Err(DecodeError::MissingPayload);
    };

    Ok(SensorRecord {
        id: input.id.to_string(),
        url: input.url.map(str::to_string),
        signal_strength: input.signal_strength,
        measurement,
    })
}

/// Decode an input into a record, or `None` when no decoder accepts it.
pub fn decode(input: &CanonicalInput<'_>) -> Option<SensorRecord> {
    try_decode(input)
        .inspect_err(|err| log_failure(input.id, err))
        .ok()
}

/// Log a failed decode at the level its cause deserves.
pub(crate) fn log_failure(id: &str, err: &DecodeError) {
    match err {
        DecodeError::Parse(parse) => error!("Parsing BLE data from {id} failed: {parse}"),
        DecodeError::UnsupportedFormat(version) => debug!(
            "Unknown tag protocol version from {id}: {version} (offset {PROTOCOL_OFFSET})"
        ),
        other => debug!("No record from {id}: {other}"),
    }
}

#[cfg(test)]
pub(crate) fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value missing");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
