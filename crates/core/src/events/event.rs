// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event values and the payloads the observable store publishes

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Published once per changed property
pub const CHANGE: &str = "change";
/// Published once per flush with every pending change
pub const CHANGES: &str = "changes";
/// Published once per tick with the coalesced changes
pub const UPDATE: &str = "update";

/// Per-property change type, e.g. `change:count`
pub fn change_type(name: &str) -> String {
    format!("{}:{}", CHANGE, name)
}

/// Identity of the object an event was dispatched from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single property change
///
/// Computed properties are announced with `value` and `former` left empty;
/// readers recompute them on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub former: Option<Value>,
}

impl Change {
    pub fn new(name: impl Into<String>, value: Value, former: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            former: Some(former),
        }
    }

    /// Change marker for a computed property whose inputs changed
    pub fn invalidation(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            former: None,
        }
    }

    pub fn is_invalidation(&self) -> bool {
        self.value.is_none() && self.former.is_none()
    }
}

/// Net effect on one property across a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub former: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    /// `change` and `change:<name>`
    Change(Change),
    /// `changes`
    Changes(Vec<Change>),
    /// `update`
    Update(BTreeMap<String, Delta>),
    /// `__error__`
    Error { message: String, error: String },
    /// Anything a caller publishes on its own
    Data(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: String,
    pub payload: Payload,
    /// Set by the bus at dispatch time
    pub target: Option<ObjectId>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_payload(kind, Payload::Empty)
    }

    pub fn with_payload(kind: impl Into<String>, payload: Payload) -> Self {
        Self {
            kind: kind.into(),
            payload,
            target: None,
        }
    }

    pub fn data(kind: impl Into<String>, data: Value) -> Self {
        Self::with_payload(kind, Payload::Data(data))
    }

    pub fn change(kind: impl Into<String>, change: Change) -> Self {
        Self::with_payload(kind, Payload::Change(change))
    }

    pub fn changes(changes: Vec<Change>) -> Self {
        Self::with_payload(CHANGES, Payload::Changes(changes))
    }

    pub fn update(changes: BTreeMap<String, Delta>) -> Self {
        Self::with_payload(UPDATE, Payload::Update(changes))
    }

    pub fn error(
        kind: impl Into<String>,
        message: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        Self::with_payload(
            kind,
            Payload::Error {
                message: message.into(),
                error: error.to_string(),
            },
        )
    }

    /// Copy of this event stamped with the dispatching object
    pub fn targeted(&self, target: &ObjectId) -> Self {
        Self {
            target: Some(target.clone()),
            ..self.clone()
        }
    }

    pub fn as_change(&self) -> Option<&Change> {
        match &self.payload {
            Payload::Change(change) => Some(change),
            _ => None,
        }
    }

    pub fn as_changes(&self) -> Option<&[Change]> {
        match &self.payload {
            Payload::Changes(changes) => Some(changes),
            _ => None,
        }
    }

    pub fn as_update(&self) -> Option<&BTreeMap<String, Delta>> {
        match &self.payload {
            Payload::Update(changes) => Some(changes),
            _ => None,
        }
    }

    /// Flat JSON view: `{type, ...payload, target}`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for Event {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.kind)?;
        match &self.payload {
            Payload::Empty => {}
            Payload::Change(change) => {
                map.serialize_entry("name", &change.name)?;
                if let Some(value) = &change.value {
                    map.serialize_entry("value", value)?;
                }
                if let Some(former) = &change.former {
                    map.serialize_entry("former", former)?;
                }
            }
            Payload::Changes(changes) => map.serialize_entry("changes", changes)?,
            Payload::Update(changes) => map.serialize_entry("changes", changes)?,
            Payload::Error { message, error } => {
                map.serialize_entry("message", message)?;
                map.serialize_entry("error", error)?;
            }
            Payload::Data(Value::Object(fields)) => {
                for (key, value) in fields {
                    if key != "type" && key != "target" {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
            Payload::Data(other) => map.serialize_entry("data", other)?,
        }
        if let Some(target) = &self.target {
            map.serialize_entry("target", target)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
