//! Core application runner for `ruuvitag-decoder`.
//!
//! Decoupled from CLI parsing, logger setup and process exit codes so it can
//! be tested deterministically with an injected advertisement source and
//! injected output streams.

use crate::advertisement::AdParser;
use crate::alias::{Alias, AliasMap};
use crate::dispatcher::Dispatcher;
use crate::input::AdvertisementSource;
use crate::output::OutputFormatter;
use crate::output::influxdb::InfluxDbFormatter;
use clap::Parser;
use log::info;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// The name of the measurement in InfluxDB line protocol.
    #[arg(long, default_value = "ruuvi_measurement")]
    pub influxdb_measurement: String,

    /// Specify human-readable alias for RuuviTag id.
    /// Format: --alias DE:AD:BE:EF:00:00=Sauna
    #[arg(long = "alias", value_parser = crate::alias::parse_alias, value_name = "ALIAS")]
    pub aliases: Vec<Alias>,

    /// Verbose output, print unparseable input lines and decode diagnostics
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// File with captured advertisements, one "ADDRESS RSSI HEX" per line.
    /// Reads stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Run the processing loop, writing formatted records to `out` and input errors to `err`.
///
/// - Advertisements that decode to a record are formatted and written as one line to `out`.
/// - Advertisements without a record are skipped; the dispatcher logs why.
/// - Unparseable input lines are written to `err` only when `options.verbose` is true.
pub async fn run_with_io<P: AdParser>(
    options: Options,
    source: &dyn AdvertisementSource,
    dispatcher: &Dispatcher<P>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let aliases: AliasMap = crate::alias::to_map(&options.aliases);
    let formatter = InfluxDbFormatter::new(options.influxdb_measurement);

    let mut advertisements = source.open().await?;
    let mut decoded = 0usize;
    let mut skipped = 0usize;

    while let Some(result) = advertisements.recv().await {
        match result {
            Ok(advertisement) => match dispatcher.identify(&advertisement) {
                Some(record) => {
                    let name = crate::alias::resolve_name(&record.id, &aliases);
                    writeln!(out, "{}", formatter.format(&record, name, SystemTime::now()))?;
                    decoded += 1;
                }
                None => skipped += 1,
            },
            Err(input_err) => {
                if options.verbose {
                    writeln!(err, "{input_err}")?;
                }
            }
        }
    }

    info!("Input finished: {decoded} records, {skipped} advertisements without RuuviTag data");
    Ok(())
}
