//! Wire messages pushed by the sensor feed.
//!
//! Every text frame carries one JSON object:
//!
//! ```json
//! {"reading":{"timestamp":1700000000000,"sensors":{
//!     "temp":{"measurement":{"value":21.5,"unit":"C"}},
//!     "door":{"boolean":{"value":true}}}}}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// A single sensor value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SensorReading {
    #[serde(rename = "measurement")]
    Measurement { value: f64, unit: String },
    #[serde(rename = "boolean")]
    Boolean { value: bool },
}

impl SensorReading {
    pub fn measurement(value: f64, unit: impl Into<String>) -> Self {
        SensorReading::Measurement {
            value,
            unit: unit.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        SensorReading::Boolean { value }
    }
}

/// Measurements print with four decimals followed by the unit, booleans as `On`/`Off`.
impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorReading::Measurement { value, unit } => write!(f, "{:.4} {}", value, unit),
            SensorReading::Boolean { value: true } => f.write_str("On"),
            SensorReading::Boolean { value: false } => f.write_str("Off"),
        }
    }
}

/// One snapshot of every sensor the upstream server knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Milliseconds since the Unix epoch, stamped by the upstream server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    pub sensors: BTreeMap<String, SensorReading>,
}

impl Reading {
    pub fn get(&self, name: &str) -> Option<&SensorReading> {
        self.sensors.get(name)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// The upstream timestamp as a UTC date, if present and in range.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.timestamp?).ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// Messages sent around the capteur ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Message {
    #[serde(rename = "reading")]
    Reading(Reading),
}

impl Message {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a binary frame holding UTF-8 JSON.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;
        Self::decode(text)
    }

    pub fn into_reading(self) -> Reading {
        match self {
            Message::Reading(reading) => reading,
        }
    }
}
