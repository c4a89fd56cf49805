//! Captured advertisement input.
//!
//! Advertisements are read one per line in the form
//! `<device address> <rssi> <hex scan data>`, e.g.
//!
//! ```text
//! CB:B8:33:4C:88:4F -67 0201061BFF99040512FC5394C37C0004FFFC040CAC364200CDCBB8334C884F
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::advertisement::RawAdvertisement;
use crate::mac_address::{MacAddress, ParseMacError};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Channel buffer size for parsed advertisements.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Errors for input lines that do not describe an advertisement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: invalid device address: {source}")]
    InvalidAddress { line: usize, source: ParseMacError },
    #[error("line {line}: invalid signal strength '{value}'")]
    InvalidSignalStrength { line: usize, value: String },
    #[error("line {line}: invalid scan data: {source}")]
    InvalidScanData {
        line: usize,
        source: hex::FromHexError,
    },
    #[error("read error: {0}")]
    Read(String),
}

/// Convenience alias for parsed advertisements or input errors.
pub type AdvertisementResult = Result<RawAdvertisement, InputError>;

/// Parse one input line. Returns `Ok(None)` for blank and comment lines.
///
/// The device address is normalized to upper case.
pub fn parse_line(line: usize, text: &str) -> Result<Option<RawAdvertisement>, InputError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let mut parts = text.split_whitespace();
    let mut next = |field: &'static str| parts.next().ok_or(InputError::MissingField { line, field });

    let address = next("device address")?
        .parse::<MacAddress>()
        .map_err(|source| InputError::InvalidAddress { line, source })?;
    let rssi = next("signal strength")?;
    let signal_strength = rssi
        .parse::<i32>()
        .map_err(|_| InputError::InvalidSignalStrength {
            line,
            value: rssi.to_string(),
        })?;
    let scan_data = hex::decode(next("scan data")?)
        .map_err(|source| InputError::InvalidScanData { line, source })?;

    Ok(Some(RawAdvertisement::new(
        address.to_string(),
        scan_data,
        signal_strength,
    )))
}

/// Read advertisements from `reader` on a background task.
///
/// Unparseable lines are forwarded as errors; a read error is forwarded and
/// ends the stream.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<AdvertisementResult>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut line_number = 0;

        loop {
            let result = match lines.next_line().await {
                Ok(Some(text)) => {
                    line_number += 1;
                    match parse_line(line_number, &text) {
                        Ok(Some(advertisement)) => Ok(advertisement),
                        Ok(None) => continue,
                        Err(error) => Err(error),
                    }
                }
                Ok(None) => break,
                Err(error) => Err(InputError::Read(error.to_string())),
            };

            let stop = matches!(result, Err(InputError::Read(_)));
            if tx.send(result).await.is_err() || stop {
                break;
            }
        }
    });

    rx
}

/// Source of captured advertisements, to allow tests without files or stdin.
pub trait AdvertisementSource: Send + Sync {
    fn open(
        &self,
    ) -> Pin<Box<dyn Future<Output = io::Result<mpsc::Receiver<AdvertisementResult>>> + Send + '_>>;
}

/// Reads advertisements from a file, or stdin when no path is given.
#[derive(Debug, Default, Clone)]
pub struct LineSource {
    path: Option<PathBuf>,
}

impl LineSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl AdvertisementSource for LineSource {
    fn open(
        &self,
    ) -> Pin<Box<dyn Future<Output = io::Result<mpsc::Receiver<AdvertisementResult>>> + Send + '_>>
    {
        Box::pin(async move {
            match &self.path {
                Some(path) => {
                    let file = tokio::fs::File::open(path).await?;
                    Ok(spawn_line_reader(BufReader::new(file)))
                }
                None => Ok(spawn_line_reader(BufReader::new(tokio::io::stdin()))),
            }
        })
    }
}
