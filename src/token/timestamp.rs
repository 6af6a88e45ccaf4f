//! Timestamps and their ISO-8601 document encoding

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::CodecError;

use super::literal::{kind_of, Literal};

/// An instant in time, encoded as an ISO-8601 string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

/// Converts timestamps to and from their document strings
///
/// Always UTC with a `Z` suffix and only as many fractional digits as the
/// instant needs, so `2024-03-01T12:00:00Z` encodes back to itself.
#[derive(Debug)]
pub struct TimestampCodec {
    precision: SecondsFormat,
}

/// Shared codec, initialized on first use and never mutated afterwards
static TIMESTAMP_CODEC: Lazy<TimestampCodec> = Lazy::new(|| {
    tracing::debug!("initializing timestamp codec");
    TimestampCodec {
        precision: SecondsFormat::AutoSi,
    }
});

/// The process-wide timestamp codec
pub fn timestamp_codec() -> &'static TimestampCodec {
    &TIMESTAMP_CODEC
}

impl TimestampCodec {
    pub fn encode(&self, timestamp: &Timestamp) -> String {
        timestamp.0.to_rfc3339_opts(self.precision, true)
    }

    pub fn parse(&self, text: &str) -> Result<Timestamp, CodecError> {
        DateTime::parse_from_rfc3339(text)
            .map(|instant| Timestamp(instant.with_timezone(&Utc)))
            .map_err(|e| {
                CodecError::format(
                    Timestamp::KIND,
                    format!("'{}' is not an ISO-8601 instant: {}", text, e),
                )
            })
    }

    pub fn decode(&self, value: &Value) -> Result<Timestamp, CodecError> {
        match value {
            Value::String(text) => self.parse(text),
            other => Err(CodecError::format(
                Timestamp::KIND,
                format!("expected timestamp string, found {}", kind_of(other)),
            )),
        }
    }
}

impl Literal for Timestamp {
    const KIND: &'static str = "timestamp";

    fn to_value(&self) -> Value {
        Value::String(timestamp_codec().encode(self))
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        timestamp_codec().decode(value)
    }
}

impl FromStr for Timestamp {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        timestamp_codec().parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&timestamp_codec().encode(self))
    }
}
