//! Raw live-room event record.
//!
//! The upstream client hands over one JSON object per event. Only `cmd` is
//! inspected eagerly; the payload under `data`/`info` stays untyped until the
//! dispatcher knows which model to build.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{RelayError, Result};

/// One decoded event record as produced by the upstream live-room client.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    fields: Map<String, Value>,
}

impl RawEvent {
    /// Parse a record from its JSON text. The top level must be an object.
    pub fn from_json(s: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(s)
            .map_err(|e| RelayError::malformed(format!("invalid event json: {e}")))?;
        Self::from_value(v)
    }

    /// Wrap an already-parsed JSON value. The value must be an object.
    pub fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RelayError::malformed(format!(
                "event must be a json object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Full tag including any version suffix. Missing or non-string `cmd`
    /// reads as the empty tag.
    pub fn cmd(&self) -> &str {
        self.fields.get("cmd").and_then(Value::as_str).unwrap_or("")
    }

    /// `data` payload (object-shaped events).
    pub fn data(&self) -> Result<&Value> {
        self.fields
            .get("data")
            .ok_or_else(|| RelayError::malformed(format!("{}: missing data", self.cmd())))
    }

    /// `info` payload (array-shaped events such as chat messages).
    pub fn info(&self) -> Result<&Value> {
        self.fields
            .get("info")
            .ok_or_else(|| RelayError::malformed(format!("{}: missing info", self.cmd())))
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Map<String, Value> serialization cannot fail.
        match serde_json::to_string(&self.fields) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("<unprintable event>"),
        }
    }
}

/// Strip the protocol version suffix: `"DANMU_MSG:4"` -> `"DANMU_MSG"`.
pub fn canonical_cmd(cmd: &str) -> &str {
    match cmd.split_once(':') {
        Some((head, _)) => head,
        None => cmd,
    }
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
