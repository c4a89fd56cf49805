//! InfluxDB line protocol output formatter.

use crate::measurement::SensorRecord;
use crate::output::OutputFormatter;
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// Field values for InfluxDB line protocol
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Float(num) => write!(f, "{num}"),
            FieldValue::Integer(num) => write!(f, "{num}i"),
            FieldValue::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<String, String>,
    pub field_set: BTreeMap<String, FieldValue>,
    pub timestamp: Option<SystemTime>,
}

/// Escape commas, equals signs and spaces in tag keys and values.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn fmt_tags(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    for (key, value) in data_point.tag_set.iter() {
        write!(fmt, ",{}={}", escape_tag(key), escape_tag(value))?;
    }
    Ok(())
}

fn fmt_fields(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    let mut first = true;
    for (key, value) in data_point.field_set.iter() {
        if first {
            first = false;
        } else {
            write!(fmt, ",")?;
        }
        write!(fmt, "{}={}", key, value)?;
    }
    Ok(())
}

fn fmt_timestamp(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    // Clocks before the epoch fall back to server-assigned time
    if let Some(since_epoch) = data_point
        .timestamp
        .and_then(|time| time.duration_since(SystemTime::UNIX_EPOCH).ok())
    {
        write!(fmt, " {}", since_epoch.as_nanos())?;
    }
    Ok(())
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.measurement)?;
        fmt_tags(self, fmt)?;
        write!(fmt, " ")?;
        fmt_fields(self, fmt)?;
        fmt_timestamp(self, fmt)
    }
}

/// InfluxDB line protocol formatter.
///
/// Tags each line with the device address and display name; humidity is
/// written as a fraction and pressure in kilopascals.
pub struct InfluxDbFormatter {
    measurement_name: String,
}

impl InfluxDbFormatter {
    #[inline]
    fn humidity_fraction(percent: f64) -> f64 {
        percent / 100.0
    }

    #[inline]
    fn pressure_kpa(pascals: f64) -> f64 {
        pascals / 1000.0
    }

    pub fn new(measurement_name: String) -> Self {
        Self { measurement_name }
    }

    fn tag_set(&self, record: &SensorRecord, name: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("mac".to_string(), record.id.clone());
        tags.insert("name".to_string(), name.to_string());
        tags.insert(
            "data_format".to_string(),
            record.measurement.data_format.to_string(),
        );
        tags
    }

    /// Build the field set. Values missing from the record are omitted.
    fn field_set(&self, record: &SensorRecord) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        let m = &record.measurement;

        macro_rules! add {
            ($name:literal, $val:expr) => {
                if let Some(v) = $val {
                    fields.insert($name.into(), FieldValue::Float(v));
                }
            };
        }

        add!("temperature", m.temperature);
        add!("humidity", m.humidity.map(Self::humidity_fraction));
        add!("pressure", m.pressure.map(Self::pressure_kpa));
        add!("battery_potential", m.battery);
        add!("tx_power", m.tx_power.map(f64::from));
        add!("movement_counter", m.movement_counter.map(f64::from));
        add!(
            "measurement_sequence_number",
            m.measurement_sequence.map(f64::from)
        );

        if let Some((x, y, z)) = m.acceleration {
            fields.insert("acceleration_x".into(), FieldValue::Float(x));
            fields.insert("acceleration_y".into(), FieldValue::Float(y));
            fields.insert("acceleration_z".into(), FieldValue::Float(z));
        }

        fields.insert(
            "rssi".into(),
            FieldValue::Integer(i64::from(record.signal_strength)),
        );
        if let Some(url) = &record.url {
            fields.insert("url".into(), FieldValue::String(url.clone()));
        }

        fields
    }

    fn to_data_point(&self, record: &SensorRecord, name: &str, timestamp: SystemTime) -> DataPoint {
        DataPoint {
            measurement: self.measurement_name.clone(),
            tag_set: self.tag_set(record, name),
            field_set: self.field_set(record),
            timestamp: Some(timestamp),
        }
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, record: &SensorRecord, name: &str, timestamp: SystemTime) -> String {
        self.to_data_point(record, name, timestamp).to_string()
    }
}
