// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the event bus and observable store

use thiserror::Error;

/// Fatal errors returned to the caller of a bus or store operation
#[derive(Debug, Error)]
pub enum ReactiveError {
    #[error("bad prop name: {0}")]
    UnknownProperty(String),
    #[error("prop {0} is computed and cannot be assigned")]
    ComputedAssignment(String),
    #[error("store has already been initialized")]
    AlreadyInitialized,
    #[error("store has not been initialized")]
    NotInitialized,
    #[error("prop {0} is already defined")]
    DuplicateProperty(String),
    #[error("the name '{0}' is reserved by a non-property member")]
    ReservedName(String),
    #[error("initial value of prop {name} is invalid: {reason}")]
    InvalidInitialValue { name: String, reason: String },
    #[error("computed prop {name} failed during dependency capture: {source}")]
    ComputedInit {
        name: String,
        #[source]
        source: HandlerError,
    },
    #[error("invalid event type: {0:?}")]
    InvalidEventType(String),
    #[error("end_action called without a matching begin_action")]
    UnbalancedAction,
    #[error("task queue still busy after {0} ticks")]
    TickLimit(usize),
    #[error("config error: {0}")]
    Config(String),
}

/// Failure raised by a listener callback or a computed getter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<ReactiveError> for HandlerError {
    fn from(err: ReactiveError) -> Self {
        Self::new(err.to_string())
    }
}

/// Why a publish result did not resolve to the dispatched event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("listener failed: {0}")]
    Listener(#[from] HandlerError),
    #[error("event source has been disposed")]
    Disposed,
    #[error("dispatch was dropped before it ran")]
    Dropped,
}
