// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus with paused/resumed delivery and two-tier scheduling
//!
//! Every published event is queued for the batched tier, whether or not it
//! reaches a listener. Listener invocation happens either synchronously or on
//! the immediate tier, from a snapshot taken at publish time.

use super::event::{Event, ObjectId};
use super::subscription::{EventTypes, Handle, Listener};
use crate::config::BusConfig;
use crate::error::{DeliveryError, HandlerError, ReactiveError};
use crate::lifecycle::{Disposable, Lifecycle};
use crate::scheduler::TaskQueue;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Called by the batched tier with every event queued since the last drain
pub type AfterEvents = Rc<dyn Fn(&[Event])>;

type DeliveryResult = Result<Event, DeliveryError>;

#[derive(Default)]
struct BusState {
    registry: HashMap<String, BTreeMap<Handle, Listener>>,
    queue: Vec<Event>,
    paused: bool,
    next_handle: u64,
    drain_scheduled: bool,
    after_events: Option<AfterEvents>,
}

struct BusInner {
    id: ObjectId,
    config: BusConfig,
    tasks: TaskQueue,
    lifecycle: Lifecycle,
    state: RefCell<BusState>,
}

/// The event bus routes published events to subscribed listeners
///
/// Clones share the same registry and queue.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl EventBus {
    pub fn new(tasks: &TaskQueue) -> Self {
        Self::with_config(tasks, &BusConfig::default())
    }

    pub fn with_config(tasks: &TaskQueue, config: &BusConfig) -> Self {
        Self::from_parts(tasks, config, ObjectId::generate(), Lifecycle::new())
    }

    /// Build a bus that shares its identity and disposal flag with an owner
    pub fn from_parts(
        tasks: &TaskQueue,
        config: &BusConfig,
        id: ObjectId,
        lifecycle: Lifecycle,
    ) -> Self {
        Self {
            inner: Rc::new(BusInner {
                id,
                config: config.clone(),
                tasks: tasks.clone(),
                lifecycle,
                state: RefCell::new(BusState {
                    next_handle: 1,
                    ..BusState::default()
                }),
            }),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.inner.id
    }

    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Subscribe a callback to one or more event types
    ///
    /// Each type gets its own registry slot; the returned handle removes all
    /// of them.
    pub fn subscribe<F>(
        &self,
        types: impl Into<EventTypes>,
        callback: F,
    ) -> Result<Unsubscribe, ReactiveError>
    where
        F: Fn(&Event) -> Result<(), HandlerError> + 'static,
    {
        let types = types.into().into_vec()?;
        if self.is_disposed() {
            tracing::debug!(bus = %self.inner.id, "subscribe on disposed bus ignored");
            return Ok(Unsubscribe::empty());
        }

        let listener: Listener = Rc::new(callback);
        let mut state = self.inner.state.borrow_mut();
        let mut entries = Vec::with_capacity(types.len());
        for kind in types {
            let handle = Handle(state.next_handle);
            state.next_handle += 1;
            tracing::debug!(bus = %self.inner.id, event = %kind, %handle, "subscribed");
            state
                .registry
                .entry(kind.clone())
                .or_default()
                .insert(handle, Rc::clone(&listener));
            entries.push((kind, handle));
        }

        Ok(Unsubscribe {
            bus: Rc::downgrade(&self.inner),
            entries: RefCell::new(entries),
        })
    }

    /// Publish with listener invocation deferred to the immediate tier
    pub fn publish(&self, event: impl Into<Event>) -> Delivery {
        self.dispatch(event.into(), false)
    }

    /// Publish with listeners invoked before this call returns
    pub fn publish_sync(&self, event: impl Into<Event>) -> Delivery {
        self.dispatch(event.into(), true)
    }

    /// Publish an event; `sync` selects inline invocation
    pub fn dispatch(&self, event: Event, sync: bool) -> Delivery {
        if self.is_disposed() {
            tracing::debug!(bus = %self.inner.id, event = %event.kind, "publish on disposed bus ignored");
            return Delivery::settled(Err(DeliveryError::Disposed));
        }

        tracing::debug!(bus = %self.inner.id, event = %event.kind, sync, "publishing event");
        self.enqueue(event.clone());

        if self.is_paused() {
            tracing::debug!(event = %event.kind, "events paused, listeners not invoked");
            return Delivery::settled(Ok(event));
        }

        let snapshot = self.snapshot(&event.kind);
        if snapshot.is_empty() {
            tracing::debug!(event = %event.kind, "no listeners");
            return Delivery::settled(Ok(event));
        }

        if sync {
            return Delivery::settled(self.inner.invoke(&event, &snapshot));
        }

        let (tx, delivery) = Delivery::pending();
        let bus = Rc::downgrade(&self.inner);
        self.inner.tasks.defer_immediate(move || {
            // A dropped bus drops `tx`, which settles the delivery as Dropped
            if let Some(inner) = bus.upgrade() {
                let _ = tx.send(inner.invoke(&event, &snapshot));
            }
        });
        delivery
    }

    /// Stop invoking listeners; events are still queued
    pub fn pause(&self) {
        if !self.is_disposed() {
            self.inner.state.borrow_mut().paused = true;
        }
    }

    pub fn resume(&self) {
        if !self.is_disposed() {
            self.inner.state.borrow_mut().paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.borrow().paused
    }

    /// Install the hook the batched tier feeds drained events to
    pub fn set_after_events(&self, hook: impl Fn(&[Event]) + 'static) {
        if !self.is_disposed() {
            self.inner.state.borrow_mut().after_events = Some(Rc::new(hook));
        }
    }

    /// Listeners registered directly on `kind` (wildcard listeners excluded)
    pub fn listener_count(&self, kind: &str) -> usize {
        self.inner
            .state
            .borrow()
            .registry
            .get(kind)
            .map_or(0, BTreeMap::len)
    }

    /// Events waiting for the next batched drain
    pub fn queued_len(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    fn enqueue(&self, event: Event) {
        let schedule = {
            let mut state = self.inner.state.borrow_mut();
            state.queue.push(event);
            !std::mem::replace(&mut state.drain_scheduled, true)
        };
        if schedule {
            let bus = Rc::downgrade(&self.inner);
            self.inner.tasks.defer_batched(move || {
                if let Some(inner) = bus.upgrade() {
                    inner.drain_events();
                }
            });
        }
    }

    /// Listeners for `kind` plus wildcard listeners, in subscription order
    fn snapshot(&self, kind: &str) -> Vec<Listener> {
        let state = self.inner.state.borrow();
        let wildcard = self.inner.config.wildcard.as_str();
        let mut found: Vec<(Handle, Listener)> = Vec::new();
        for key in [kind, wildcard] {
            if let Some(listeners) = state.registry.get(key) {
                found.extend(listeners.iter().map(|(h, l)| (*h, Rc::clone(l))));
            }
            if kind == wildcard {
                break;
            }
        }
        found.sort_by_key(|(handle, _)| *handle);
        found.into_iter().map(|(_, listener)| listener).collect()
    }
}

impl BusInner {
    fn invoke(&self, event: &Event, snapshot: &[Listener]) -> DeliveryResult {
        let event = event.targeted(&self.id);
        if self.lifecycle.is_disposed() {
            tracing::warn!(bus = %self.id, event = %event.kind, "bus disposed, dispatch skipped");
            return Ok(event);
        }

        for listener in snapshot {
            if let Err(err) = listener(&event) {
                tracing::error!(bus = %self.id, event = %event.kind, error = %err, "listener failed");
                return Err(DeliveryError::Listener(err));
            }
        }
        Ok(event)
    }

    fn drain_events(&self) {
        // Taken before the hook runs, so events it publishes land in a fresh queue
        let (events, hook) = {
            let mut state = self.state.borrow_mut();
            state.drain_scheduled = false;
            (std::mem::take(&mut state.queue), state.after_events.clone())
        };

        if events.is_empty() {
            return;
        }
        if self.lifecycle.is_disposed() {
            tracing::debug!(bus = %self.id, "bus disposed, after-events skipped");
            return;
        }

        tracing::debug!(bus = %self.id, count = events.len(), "draining queued events");
        if let Some(hook) = hook {
            hook(events.as_slice());
        }
    }
}

impl Disposable for EventBus {
    fn is_disposed(&self) -> bool {
        self.inner.lifecycle.is_disposed()
    }

    /// Discard the registry and the queue; safe to call more than once
    fn dispose(&self) {
        self.inner.lifecycle.mark_disposed();
        let mut state = self.inner.state.borrow_mut();
        state.registry.clear();
        state.queue.clear();
        state.after_events = None;
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("EventBus")
            .field("id", &self.inner.id)
            .field("types", &state.registry.len())
            .field("queued", &state.queue.len())
            .field("paused", &state.paused)
            .finish()
    }
}

/// Removes the registry slots created by one `subscribe` call
///
/// Calling it more than once, or after the bus is gone, does nothing.
/// Dropping it leaves the listeners registered.
pub struct Unsubscribe {
    bus: Weak<BusInner>,
    entries: RefCell<Vec<(String, Handle)>>,
}

impl Unsubscribe {
    fn empty() -> Self {
        Self {
            bus: Weak::new(),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn unsubscribe(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        let Some(inner) = self.bus.upgrade() else {
            return;
        };

        let mut state = inner.state.borrow_mut();
        for (kind, handle) in entries {
            if let Some(listeners) = state.registry.get_mut(&kind) {
                listeners.remove(&handle);
                if listeners.is_empty() {
                    state.registry.remove(&kind);
                }
            }
        }
    }

    /// Handles still registered through this subscription
    pub fn handles(&self) -> Vec<Handle> {
        self.entries.borrow().iter().map(|(_, h)| *h).collect()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("entries", &self.entries.borrow())
            .finish()
    }
}

/// Outcome of a publish, settled once listeners have run
///
/// Awaitable; `try_result` reads it without an executor. The result can be
/// taken once.
#[derive(Debug)]
pub struct Delivery {
    rx: oneshot::Receiver<DeliveryResult>,
}

impl Delivery {
    fn settled(result: DeliveryResult) -> Self {
        let (tx, delivery) = Self::pending();
        let _ = tx.send(result);
        delivery
    }

    fn pending() -> (oneshot::Sender<DeliveryResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// The result if dispatch has finished, `None` while it is still queued
    pub fn try_result(&mut self) -> Option<DeliveryResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DeliveryError::Dropped)),
        }
    }
}

impl Future for Delivery {
    type Output = DeliveryResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DeliveryError::Dropped)))
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
