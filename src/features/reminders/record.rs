//! # Reminder Records
//!
//! The reminder entity and its persisted form: an ordered
//! `[text, "YYYYDDMM-HHMMSS±ZZZZ", repeat_count?]` tuple.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Undecodable entries are reported so they can be written back untouched
//! - 1.1.0: Read legacy dashed-offset timestamps and epoch seconds
//! - 1.0.0: Initial release

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ReminderError, Result};

/// Canonical timestamp layout (year, day, month)
pub const TIMESTAMP_FORMAT: &str = "%Y%d%m-%H%M%S%z";

/// Layout written by older versions, with a dash before the offset
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y%d%m-%H%M%S-%z";

/// Render a timestamp in the canonical layout
pub fn serialize_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp in either the canonical or the legacy layout
pub fn deserialize_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT))
        .map_err(|e| ReminderError::InvalidRecord(format!("bad timestamp '{}': {}", raw, e)))
}

/// A pending reminder. Identity is the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub text: String,
    pub due_at: DateTime<FixedOffset>,
    /// Times this reminder has already fired and been re-queued
    pub repeat_count: u32,
}

impl Reminder {
    pub fn new(text: impl Into<String>, due_at: DateTime<FixedOffset>) -> Self {
        Self {
            text: text.into(),
            due_at,
            repeat_count: 0,
        }
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        now >= self.due_at
    }

    /// Decode one stored tuple
    pub fn from_value(value: &Value) -> Result<Self> {
        let parts = value
            .as_array()
            .ok_or_else(|| ReminderError::InvalidRecord(format!("expected a list, got {}", value)))?;

        if !(2..=3).contains(&parts.len()) {
            return Err(ReminderError::InvalidRecord(format!(
                "expected 2 or 3 elements, got {}",
                parts.len()
            )));
        }

        let text = parts[0]
            .as_str()
            .ok_or_else(|| ReminderError::InvalidRecord("text must be a string".to_string()))?;

        let due_at = match &parts[1] {
            Value::String(raw) => deserialize_timestamp(raw)?,
            Value::Number(n) => {
                let secs = n.as_f64().ok_or_else(|| {
                    ReminderError::InvalidRecord(format!("bad epoch timestamp {}", n))
                })?;
                Utc.timestamp_opt(secs.trunc() as i64, 0)
                    .single()
                    .ok_or_else(|| {
                        ReminderError::InvalidRecord(format!("epoch out of range {}", n))
                    })?
                    .fixed_offset()
            }
            other => {
                return Err(ReminderError::InvalidRecord(format!(
                    "bad timestamp {}",
                    other
                )))
            }
        };

        let repeat_count = match parts.get(2) {
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ReminderError::InvalidRecord(format!("bad repeat count {}", v)))?,
            None => 0,
        };

        Ok(Reminder {
            text: text.to_string(),
            due_at,
            repeat_count,
        })
    }

    pub fn to_value(&self) -> Value {
        // Infallible: only strings and integers
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Reminder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // Fresh reminders are stored as pairs, re-queued ones carry their repeat count
        let len = if self.repeat_count == 0 { 2 } else { 3 };
        let mut tuple = serializer.serialize_tuple(len)?;
        tuple.serialize_element(&self.text)?;
        tuple.serialize_element(&serialize_timestamp(&self.due_at))?;
        if self.repeat_count > 0 {
            tuple.serialize_element(&self.repeat_count)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Reminder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Reminder::from_value(&value).map_err(de::Error::custom)
    }
}

/// Decode the `reminders` settings value, skipping undecodable entries
pub fn decode_list(value: Option<Value>) -> Vec<Reminder> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match Reminder::from_value(item) {
                Ok(r) => Some(r),
                Err(e) => {
                    log::warn!("Skipping stored reminder {}: {}", item, e);
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            log::warn!("Ignoring malformed reminders setting: {}", other);
            Vec::new()
        }
    }
}

pub fn encode_list(reminders: &[Reminder]) -> Value {
    Value::Array(reminders.iter().map(Reminder::to_value).collect())
}

/// Stored entries that do not decode, in their original form
///
/// A non-list setting cannot be merged with and is an error.
pub fn undecodable_entries(value: Option<&Value>) -> Result<Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter(|item| Reminder::from_value(item).is_err())
            .cloned()
            .collect()),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(other) => Err(ReminderError::InvalidRecord(format!(
            "reminders setting is not a list: {}",
            other
        ))),
    }
}
