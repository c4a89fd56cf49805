//! Output formatters for decoded RuuviTag records.

pub mod influxdb;

use crate::measurement::SensorRecord;
use std::time::SystemTime;

/// Trait for formatting records into output lines.
pub trait OutputFormatter: Send + Sync {
    /// Format a record.
    ///
    /// # Arguments
    /// * `record` - The decoded record
    /// * `name` - Resolved display name for the device
    /// * `timestamp` - When the advertisement was received
    fn format(&self, record: &SensorRecord, name: &str, timestamp: SystemTime) -> String;
}
