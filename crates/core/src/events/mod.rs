// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events system
//!
//! This module provides:
//! - `EventBus` - Subscribe, publish, pause and resume, with listener
//!   invocation routed through the two scheduling tiers
//! - `Event` - Typed event values and the store's change payloads
//! - `EventTypes` / `Handle` - Subscription targets and registry handles

mod bus;
mod event;
mod subscription;

pub use bus::{AfterEvents, Delivery, EventBus, Unsubscribe};
pub use event::{change_type, Change, Delta, Event, ObjectId, Payload, CHANGE, CHANGES, UPDATE};
pub use subscription::{EventTypes, Handle, Listener};
