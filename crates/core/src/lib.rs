// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ripple-core: change propagation for component models
//!
//! This crate provides:
//! - A two-tier cooperative task queue (immediate and batched work per tick)
//! - An event bus with multi-type subscriptions and paused delivery
//! - An observable property store with computed-property dependency capture,
//!   batched flushes and per-tick `update` summaries

pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod observable;
pub mod scheduler;

// Re-exports
pub use config::{BusConfig, Config, SchedulerConfig};
pub use error::{DeliveryError, HandlerError, ReactiveError};
pub use events::{
    change_type, Change, Delivery, Delta, Event, EventBus, EventTypes, Handle, ObjectId, Payload,
    Unsubscribe,
};
pub use lifecycle::{Disposable, Lifecycle};
pub use observable::{DependencySpy, ObservableStore, PropertyDef, PropertyKind, Scope, StoreInit};
pub use scheduler::{TaskQueue, TickReport, Tier};
