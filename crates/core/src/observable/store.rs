// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable property store
//!
//! Writes are validated, cloned and diffed; real changes become pending
//! changes, cascade to the computed properties observing them, and are
//! flushed as `change`, `change:<name>` and `changes` events. After each tick
//! the bus's batched tier hands the drained events back to the store, which
//! folds them into a single `update` event.

use super::pending::{summarize, PendingChanges};
use super::property::{
    default_clone, default_equal, CloneFn, EqualFn, Getter, Initial, Property, PropertyDef,
    PropertyKind, Scope,
};
use super::spy::DependencySpy;
use crate::config::Config;
use crate::error::{HandlerError, ReactiveError};
use crate::events::{
    change_type, Change, Delivery, Event, EventBus, EventTypes, ObjectId, Unsubscribe, CHANGE,
};
use crate::lifecycle::{Disposable, Lifecycle};
use crate::scheduler::TaskQueue;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

/// Everything `initialize` sets up in one go
#[derive(Default)]
pub struct StoreInit {
    plain: Vec<(String, PropertyDef)>,
    computed: Vec<(String, Getter)>,
    equal: Option<EqualFn>,
    clone: Option<CloneFn>,
}

impl StoreInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(mut self, name: impl Into<String>, def: impl Into<PropertyDef>) -> Self {
        self.plain.push((name.into(), def.into()));
        self
    }

    pub fn computed<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<Value, HandlerError> + 'static,
    {
        self.computed.push((name.into(), Rc::new(getter)));
        self
    }

    pub fn equality(mut self, equal: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.equal = Some(Rc::new(equal));
        self
    }

    pub fn cloning(mut self, clone: impl Fn(&Value) -> Value + 'static) -> Self {
        self.clone = Some(Rc::new(clone));
        self
    }
}

#[derive(Default)]
struct StoreState {
    initialized: bool,
    props: HashMap<String, Property>,
    /// Definition order, used for cascades and `names()`
    order: Vec<String>,
    reserved: HashSet<String>,
    pending: PendingChanges,
    acting: usize,
    /// A flush happened since the last `update`
    updated: bool,
    equal: Option<EqualFn>,
    clone: Option<CloneFn>,
}

impl StoreState {
    fn strategies(&self) -> (EqualFn, CloneFn) {
        (
            self.equal.clone().unwrap_or_else(|| Rc::new(default_equal)),
            self.clone.clone().unwrap_or_else(|| Rc::new(default_clone)),
        )
    }

    fn check_name(&self, name: &str) -> Result<(), ReactiveError> {
        if !self.initialized {
            return Err(ReactiveError::NotInitialized);
        }
        if self.props.contains_key(name) {
            return Err(ReactiveError::DuplicateProperty(name.to_string()));
        }
        if self.reserved.contains(name) {
            return Err(ReactiveError::ReservedName(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, name: String, prop: Property) {
        self.order.push(name.clone());
        self.props.insert(name, prop);
    }

    fn remove(&mut self, name: &str) {
        self.props.remove(name);
        self.order.retain(|n| n != name);
    }

    /// Record a change and invalidate every computed property observing it
    fn enqueue(&mut self, change: Change) {
        let name = change.name.clone();
        if !self.pending.record(change) {
            return;
        }

        let dependents: Vec<String> = self
            .order
            .iter()
            .filter(|n| self.props.get(n.as_str()).is_some_and(|p| p.observes(&name)))
            .cloned()
            .collect();
        for dependent in dependents {
            self.enqueue(Change::invalidation(dependent));
        }
    }
}

/// What a read found in the property table
enum Slot {
    Stored(Value, CloneFn),
    Derived(Getter),
}

struct StoreInner {
    bus: EventBus,
    lifecycle: Lifecycle,
    state: RefCell<StoreState>,
}

/// A set of named, observable properties backed by its own event bus
///
/// Clones share the same properties and bus.
#[derive(Clone)]
pub struct ObservableStore {
    inner: Rc<StoreInner>,
}

impl ObservableStore {
    pub fn new(tasks: &TaskQueue) -> Self {
        Self::with_config(tasks, &Config::default())
    }

    pub fn with_config(tasks: &TaskQueue, config: &Config) -> Self {
        Self::with_id(tasks, config, ObjectId::generate())
    }

    pub fn with_id(tasks: &TaskQueue, config: &Config, id: ObjectId) -> Self {
        let lifecycle = Lifecycle::new();
        let bus = EventBus::from_parts(tasks, &config.bus, id, lifecycle.clone());
        let store = Self {
            inner: Rc::new(StoreInner {
                bus,
                lifecycle,
                state: RefCell::new(StoreState::default()),
            }),
        };

        let weak: Weak<StoreInner> = Rc::downgrade(&store.inner);
        store.inner.bus.set_after_events(move |events| {
            if let Some(inner) = weak.upgrade() {
                ObservableStore { inner }.after_events(events);
            }
        });
        store
    }

    pub fn id(&self) -> &ObjectId {
        self.inner.bus.id()
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// One-time setup: strategies, then plain properties, then computed ones
    pub fn initialize(&self, init: StoreInit) -> Result<(), ReactiveError> {
        if self.is_disposed() {
            return Ok(());
        }
        {
            let mut state = self.inner.state.borrow_mut();
            if state.initialized {
                return Err(ReactiveError::AlreadyInitialized);
            }
            state.initialized = true;
            state.equal = Some(init.equal.unwrap_or_else(|| Rc::new(default_equal)));
            state.clone = Some(init.clone.unwrap_or_else(|| Rc::new(default_clone)));
        }

        for (name, def) in init.plain {
            self.define(name, def)?;
        }
        for (name, getter) in init.computed {
            self.define_getter(name, getter)?;
        }
        tracing::debug!(store = %self.id(), props = self.inner.state.borrow().order.len(), "store initialized");
        Ok(())
    }

    /// Claim a name for a non-property member so no property can take it
    pub fn reserve(&self, name: impl Into<String>) {
        if !self.is_disposed() {
            self.inner.state.borrow_mut().reserved.insert(name.into());
        }
    }

    /// Define a plain property
    pub fn define(
        &self,
        name: impl Into<String>,
        def: impl Into<PropertyDef>,
    ) -> Result<(), ReactiveError> {
        if self.is_disposed() {
            return Ok(());
        }
        let name = name.into();
        let PropertyDef { initial, validator } = def.into();
        let clone = {
            let state = self.inner.state.borrow();
            state.check_name(&name)?;
            state.strategies().1
        };

        let value = match initial {
            Initial::Value(value) => clone(&value),
            Initial::Producer(produce) => produce(self),
        };
        if let Some(validator) = &validator {
            validator(&value).map_err(|reason| ReactiveError::InvalidInitialValue {
                name: name.clone(),
                reason,
            })?;
        }

        let mut state = self.inner.state.borrow_mut();
        // A producer may have defined properties of its own
        state.check_name(&name)?;
        tracing::debug!(store = %self.id(), prop = %name, "defined prop");
        state.insert(name, Property::Plain { value, validator });
        Ok(())
    }

    /// Define a computed property and capture its dependencies
    ///
    /// The getter runs once here; the names it reads become the property's
    /// fixed dependency set. A failure is published as an error event and
    /// aborts the definition.
    pub fn define_computed<F>(
        &self,
        name: impl Into<String>,
        getter: F,
    ) -> Result<(), ReactiveError>
    where
        F: Fn(&Scope<'_>) -> Result<Value, HandlerError> + 'static,
    {
        self.define_getter(name.into(), Rc::new(getter))
    }

    fn define_getter(&self, name: String, getter: Getter) -> Result<(), ReactiveError> {
        if self.is_disposed() {
            return Ok(());
        }
        {
            let mut state = self.inner.state.borrow_mut();
            state.check_name(&name)?;
            state.insert(
                name.clone(),
                Property::Computed {
                    getter: Rc::clone(&getter),
                    observing: BTreeSet::new(),
                },
            );
        }

        let spy = RefCell::new(DependencySpy::begin_capture(name.clone()));
        let result = self.evaluate(&name, &getter, Some(&spy));
        let found = spy.borrow_mut().end_capture();

        match result {
            Ok(_) => {
                tracing::debug!(store = %self.id(), prop = %name, observing = ?found, "defined computed prop");
                if let Some(Property::Computed { observing, .. }) =
                    self.inner.state.borrow_mut().props.get_mut(&name)
                {
                    *observing = found;
                }
                Ok(())
            }
            Err(source) => {
                self.inner.state.borrow_mut().remove(&name);
                let message = format!(
                    "Exception caught in getter of prop({}), dependency capture failed.",
                    name
                );
                self.publish_error(message, &source);
                Err(ReactiveError::ComputedInit { name, source })
            }
        }
    }

    /// Read a property
    ///
    /// Plain values come back as clones; computed values are re-evaluated.
    /// `Ok(None)` means undefined: the store is disposed or a computed getter
    /// failed.
    pub fn get(&self, name: &str) -> Result<Option<Value>, ReactiveError> {
        self.read(name, None)
    }

    pub(crate) fn read(
        &self,
        name: &str,
        spy: Option<&RefCell<DependencySpy>>,
    ) -> Result<Option<Value>, ReactiveError> {
        if self.is_disposed() {
            return Ok(None);
        }

        let slot = {
            let state = self.inner.state.borrow();
            match state.props.get(name) {
                None => return Err(ReactiveError::UnknownProperty(name.to_string())),
                Some(Property::Plain { value, .. }) => {
                    let (_, clone) = state.strategies();
                    Slot::Stored(value.clone(), clone)
                }
                Some(Property::Computed { getter, .. }) => Slot::Derived(Rc::clone(getter)),
            }
        };

        if let Some(spy) = spy {
            spy.borrow_mut().record_read(name);
        }
        let getter = match slot {
            // Strategies run unborrowed; they may read the store themselves
            Slot::Stored(value, clone) => return Ok(Some(clone(&value))),
            Slot::Derived(getter) => getter,
        };

        match self.evaluate(name, &getter, spy) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                let message = format!("Exception caught in getter of prop({}).", name);
                self.publish_error(message, &err);
                Ok(None)
            }
        }
    }

    /// Run a getter, restoring the spy's running getter afterwards so reads
    /// the caller makes after a nested computed read are still attributed to it
    fn evaluate(
        &self,
        name: &str,
        getter: &Getter,
        spy: Option<&RefCell<DependencySpy>>,
    ) -> Result<Value, HandlerError> {
        let previous =
            spy.map(|spy| spy.borrow_mut().set_running_getter(Some(name.to_string())));
        let result = getter(&Scope { store: self, spy });
        if let (Some(spy), Some(previous)) = (spy, previous) {
            spy.borrow_mut().set_running_getter(previous);
        }
        result
    }

    /// Write a plain property
    ///
    /// A value the validator rejects, or one equal to the current value, is
    /// dropped without an event.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ReactiveError> {
        if self.is_disposed() {
            return Ok(());
        }
        let value = value.into();

        let (validator, equal, clone, current) = {
            let state = self.inner.state.borrow();
            let (equal, clone) = state.strategies();
            match state.props.get(name) {
                None => return Err(ReactiveError::UnknownProperty(name.to_string())),
                Some(Property::Computed { .. }) => {
                    return Err(ReactiveError::ComputedAssignment(name.to_string()))
                }
                Some(Property::Plain { validator, value }) => {
                    (validator.clone(), equal, clone, value.clone())
                }
            }
        };

        if let Some(validator) = validator {
            if let Err(reason) = validator(&value) {
                tracing::debug!(store = %self.id(), prop = %name, %reason, "write rejected");
                return Ok(());
            }
        }

        let former = clone(&current);
        if equal(&value, &former) {
            return Ok(());
        }
        let next = clone(&value);

        let flush = {
            let mut state = self.inner.state.borrow_mut();
            let Some(Property::Plain { value: stored, .. }) = state.props.get_mut(name) else {
                return Err(ReactiveError::UnknownProperty(name.to_string()));
            };
            *stored = next;
            state.enqueue(Change::new(name, value, former));
            state.acting == 0
        };

        if flush {
            self.flush();
        }
        Ok(())
    }

    /// Apply several writes with a single flush
    pub fn set_many<I, K, V>(&self, entries: I) -> Result<(), ReactiveError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.begin_action();
        let result = entries
            .into_iter()
            .try_for_each(|(name, value)| self.set(name.as_ref(), value));
        self.end_action()?;
        result
    }

    /// Open a region in which flushes are held back; regions nest
    pub fn begin_action(&self) {
        if self.is_disposed() {
            return;
        }
        let mut state = self.inner.state.borrow_mut();
        state.acting += 1;
        tracing::debug!(store = %self.id(), depth = state.acting, "action begun");
    }

    /// Close a region; closing the outermost one flushes everything pending
    pub fn end_action(&self) -> Result<(), ReactiveError> {
        if self.is_disposed() {
            return Ok(());
        }
        let flush = {
            let mut state = self.inner.state.borrow_mut();
            if state.acting == 0 {
                return Err(ReactiveError::UnbalancedAction);
            }
            state.acting -= 1;
            tracing::debug!(store = %self.id(), depth = state.acting, "action ended");
            state.acting == 0
        };
        if flush {
            self.flush();
        }
        Ok(())
    }

    /// Run `f` inside an action
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> Result<R, ReactiveError> {
        self.begin_action();
        let result = f(self);
        self.end_action()?;
        Ok(result)
    }

    pub fn is_acting(&self) -> bool {
        self.inner.state.borrow().acting > 0
    }

    /// Changes recorded but not yet flushed
    pub fn pending_changes(&self) -> Vec<Change> {
        self.inner.state.borrow().pending.as_slice().to_vec()
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.state.borrow().props.contains_key(name)
    }

    /// Property names in definition order
    pub fn names(&self) -> Vec<String> {
        self.inner.state.borrow().order.clone()
    }

    pub fn kind(&self, name: &str) -> Option<PropertyKind> {
        self.inner.state.borrow().props.get(name).map(Property::kind)
    }

    /// Dependencies captured for a computed property
    pub fn observing(&self, name: &str) -> Option<BTreeSet<String>> {
        match self.inner.state.borrow().props.get(name) {
            Some(Property::Computed { observing, .. }) => Some(observing.clone()),
            _ => None,
        }
    }

    pub fn subscribe<F>(
        &self,
        types: impl Into<EventTypes>,
        callback: F,
    ) -> Result<Unsubscribe, ReactiveError>
    where
        F: Fn(&Event) -> Result<(), HandlerError> + 'static,
    {
        self.inner.bus.subscribe(types, callback)
    }

    pub fn publish(&self, event: impl Into<Event>) -> Delivery {
        self.inner.bus.publish(event)
    }

    pub fn publish_sync(&self, event: impl Into<Event>) -> Delivery {
        self.inner.bus.publish_sync(event)
    }

    pub fn pause(&self) {
        self.inner.bus.pause();
    }

    pub fn resume(&self) {
        self.inner.bus.resume();
    }

    /// Publish pending changes: per-name events first, then one aggregate
    ///
    /// With nothing pending no event is published, not even an empty
    /// `changes`.
    fn flush(&self) {
        let changes = self.inner.state.borrow_mut().pending.take();
        if changes.is_empty() {
            return;
        }

        tracing::debug!(store = %self.id(), count = changes.len(), "flushing changes");
        for change in &changes {
            self.deliver(Event::change(CHANGE, change.clone()));
            self.deliver(Event::change(change_type(&change.name), change.clone()));
        }
        self.deliver(Event::changes(changes));
        self.inner.state.borrow_mut().updated = true;
    }

    fn after_events(&self, events: &[Event]) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.updated || events.is_empty() {
                return;
            }
            state.updated = false;
        }

        let changes = summarize(events);
        tracing::debug!(store = %self.id(), props = changes.len(), "publishing update");
        self.deliver(Event::update(changes));
    }

    fn publish_error(&self, message: String, err: &HandlerError) {
        tracing::error!(store = %self.id(), error = %err, "{}", message);
        let kind = self.inner.bus.config().error_event.clone();
        self.deliver(Event::error(kind, message, err));
    }

    fn deliver(&self, event: Event) {
        let kind = event.kind.clone();
        if let Some(Err(err)) = self.inner.bus.publish_sync(event).try_result() {
            tracing::warn!(store = %self.id(), event = %kind, error = %err, "delivery failed");
        }
    }
}

impl Disposable for ObservableStore {
    fn is_disposed(&self) -> bool {
        self.inner.lifecycle.is_disposed()
    }

    /// Discard properties, strategies, pending changes and the bus
    fn dispose(&self) {
        self.inner.lifecycle.mark_disposed();
        {
            let mut state = self.inner.state.borrow_mut();
            state.props.clear();
            state.order.clear();
            state.pending.clear();
            state.equal = None;
            state.clone = None;
        }
        self.inner.bus.dispose();
    }
}

impl fmt::Debug for ObservableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ObservableStore")
            .field("id", self.id())
            .field("props", &state.order)
            .field("pending", &state.pending.len())
            .field("acting", &state.acting)
            .finish()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
