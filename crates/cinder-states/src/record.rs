//! The canonical record stored under each cache key.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use cinder_core::{BuildState, Error, StateSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Latest known build state for one cache key.
///
/// `state` and `finished_at` are the only fields this crate interprets;
/// anything else a writer includes rides along in `extra` untouched and
/// comes back on the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub state: BuildState,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "finished_at_wire"
    )]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StateRecord {
    /// Canonical record with `finished_at` normalized to second precision.
    pub fn new(state: BuildState, finished_at: Option<DateTime<Utc>>) -> Self {
        Self {
            state,
            finished_at: finished_at.map(truncate_to_second),
            extra: BTreeMap::new(),
        }
    }

    /// Attach a passthrough field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::from)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}

impl<S: StateSource> From<&S> for StateRecord {
    fn from(source: &S) -> Self {
        StateRecord::new(source.state(), source.finished_at())
    }
}

impl TryFrom<Value> for StateRecord {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        serde_json::from_value(value).map_err(Error::from)
    }
}

/// Wire form of `finished_at`: UTC, second precision, trailing `Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses the wire form plus the narrower shapes older writers produced
/// (`2013-04-22T22:10:00`, `2013-04-22T22:10` — no zone, no seconds).
/// Everything is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(truncate_to_second(ts.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

mod finished_at_wire {
    use super::{DateTime, Utc, format_timestamp, parse_timestamp};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(*ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {:?}", raw))),
        }
    }
}
