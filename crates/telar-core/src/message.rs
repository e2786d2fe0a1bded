//! Addressed control-rate messages.
//!
//! A [`Message`] pairs a dot-delimited address with a [`Record`] payload: an
//! open keyed record of tagged [`Value`]s. Receivers read fields through
//! checked accessors that fail closed — a missing key or a value of the
//! wrong type reads as `None` and the receiver ignores the message, so a
//! malformed payload can never raise from inside the audio-rate path.

#[cfg(not(feature = "std"))]
use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

/// A dynamically typed payload value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Scalar number.
    Float(f32),
    /// Text, typically a command name or a key for note matching.
    Str(String),
    /// Nested record.
    Record(Record),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

/// An open keyed record of [`Value`]s.
///
/// Payloads carry at minimum a `"command"` string; everything else is
/// command-specific. The `with` builder keeps construction terse:
///
/// ```rust
/// use telar_core::Record;
///
/// let payload = Record::new()
///     .with("command", "trigger")
///     .with("duration", 0.25f32)
///     .with("amplitude", 0.8f32);
/// assert_eq!(payload.command(), Some("trigger"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a field, replacing any previous value under the same key.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Returns the raw value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns true if the record carries `key`, regardless of type.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Checked scalar access: `None` unless the field is a `Float`.
    pub fn float(&self, key: &str) -> Option<f32> {
        match self.fields.get(key) {
            Some(Value::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Checked text access: `None` unless the field is a `Str`.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Checked flag access: `None` unless the field is a `Bool`.
    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(Value::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Checked nested-record access.
    pub fn record(&self, key: &str) -> Option<&Record> {
        match self.fields.get(key) {
            Some(Value::Record(v)) => Some(v),
            _ => None,
        }
    }

    /// Shorthand for the `"command"` field every routed payload carries.
    pub fn command(&self) -> Option<&str> {
        self.string("command")
    }
}

/// A payload addressed to a receiver by dot-delimited path.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Dot-delimited receiver path, resolved against patch registries.
    pub address: String,
    /// The keyed payload delivered on resolution.
    pub payload: Record,
}

impl Message {
    /// Creates a message for the given address.
    pub fn new(address: impl Into<String>, payload: Record) -> Self {
        Self {
            address: address.into(),
            payload,
        }
    }
}
