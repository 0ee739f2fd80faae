// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener handles and subscription targets

use super::event::Event;
use crate::error::{HandlerError, ReactiveError};
use std::fmt;
use std::rc::Rc;

/// Callback invoked with each dispatched event
pub type Listener = Rc<dyn Fn(&Event) -> Result<(), HandlerError>>;

/// Registry slot for one listener on one event type
///
/// Handles only ever increase, so a stale handle never matches a newer
/// registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One event type or several, subscribed independently
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTypes {
    One(String),
    Many(Vec<String>),
}

impl EventTypes {
    /// Flatten into a list, rejecting empty type names
    pub fn into_vec(self) -> Result<Vec<String>, ReactiveError> {
        let types = match self {
            EventTypes::One(kind) => vec![kind],
            EventTypes::Many(kinds) => kinds,
        };
        if let Some(bad) = types.iter().find(|kind| kind.is_empty()) {
            return Err(ReactiveError::InvalidEventType(bad.clone()));
        }
        Ok(types)
    }
}

impl From<&str> for EventTypes {
    fn from(kind: &str) -> Self {
        EventTypes::One(kind.to_string())
    }
}

impl From<String> for EventTypes {
    fn from(kind: String) -> Self {
        EventTypes::One(kind)
    }
}

impl From<&String> for EventTypes {
    fn from(kind: &String) -> Self {
        EventTypes::One(kind.clone())
    }
}

impl From<Vec<String>> for EventTypes {
    fn from(kinds: Vec<String>) -> Self {
        EventTypes::Many(kinds)
    }
}

impl From<Vec<&str>> for EventTypes {
    fn from(kinds: Vec<&str>) -> Self {
        EventTypes::Many(kinds.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for EventTypes {
    fn from(kinds: &[&str]) -> Self {
        EventTypes::Many(kinds.iter().map(|kind| kind.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventTypes {
    fn from(kinds: [&str; N]) -> Self {
        EventTypes::Many(kinds.iter().map(|kind| kind.to_string()).collect())
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
