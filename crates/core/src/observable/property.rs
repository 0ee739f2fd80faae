// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property definitions and the accessor table entries built from them

use super::spy::DependencySpy;
use super::store::ObservableStore;
use crate::error::{HandlerError, ReactiveError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Rejects a value by returning `Err(reason)`
pub type Validator = Rc<dyn Fn(&Value) -> Result<(), String>>;
/// Derives a computed value from other properties
pub type Getter = Rc<dyn Fn(&Scope<'_>) -> Result<Value, HandlerError>>;
/// Produces an initial value in the context of the store being defined
pub type Producer = Box<dyn FnOnce(&ObservableStore) -> Value>;
/// Equality strategy used to diff writes
pub type EqualFn = Rc<dyn Fn(&Value, &Value) -> bool>;
/// Clone strategy applied on every read and write
pub type CloneFn = Rc<dyn Fn(&Value) -> Value>;

pub fn default_equal(a: &Value, b: &Value) -> bool {
    a == b
}

pub fn default_clone(value: &Value) -> Value {
    value.clone()
}

pub enum Initial {
    Value(Value),
    Producer(Producer),
}

/// Definition of a plain property
pub struct PropertyDef {
    pub(crate) initial: Initial,
    pub(crate) validator: Option<Validator>,
}

impl PropertyDef {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            initial: Initial::Value(value.into()),
            validator: None,
        }
    }

    pub fn producer(produce: impl FnOnce(&ObservableStore) -> Value + 'static) -> Self {
        Self {
            initial: Initial::Producer(Box::new(produce)),
            validator: None,
        }
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&Value) -> Result<(), String> + 'static,
    ) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }
}

impl From<Value> for PropertyDef {
    fn from(value: Value) -> Self {
        Self::value(value)
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let initial = match &self.initial {
            Initial::Value(value) => format!("{}", value),
            Initial::Producer(_) => "<producer>".to_string(),
        };
        f.debug_struct("PropertyDef")
            .field("initial", &initial)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Plain,
    Computed,
}

pub(crate) enum Property {
    Plain {
        value: Value,
        validator: Option<Validator>,
    },
    Computed {
        getter: Getter,
        /// Fixed after the initializing evaluation
        observing: BTreeSet<String>,
    },
}

impl Property {
    pub(crate) fn kind(&self) -> PropertyKind {
        match self {
            Property::Plain { .. } => PropertyKind::Plain,
            Property::Computed { .. } => PropertyKind::Computed,
        }
    }

    pub(crate) fn observes(&self, name: &str) -> bool {
        match self {
            Property::Computed { observing, .. } => observing.contains(name),
            Property::Plain { .. } => false,
        }
    }
}

/// Read access handed to computed getters
///
/// Reads made through a scope are reported to the dependency spy of the
/// evaluation that created it, if any.
pub struct Scope<'a> {
    pub(crate) store: &'a ObservableStore,
    pub(crate) spy: Option<&'a RefCell<DependencySpy>>,
}

impl<'a> Scope<'a> {
    /// Read a property; an undefined result reads as `null`
    pub fn get(&self, name: &str) -> Result<Value, HandlerError> {
        Ok(self.try_get(name)?.unwrap_or(Value::Null))
    }

    pub fn try_get(&self, name: &str) -> Result<Option<Value>, ReactiveError> {
        self.store.read(name, self.spy)
    }
}
