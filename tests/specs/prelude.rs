//! Shared helpers for specs

pub use ripple_core::events::{CHANGE, CHANGES, UPDATE};
pub use ripple_core::{
    Change, DeliveryError, Disposable, Event, EventBus, HandlerError, ObservableStore,
    Scope, StoreInit, TaskQueue,
};
pub use serde_json::json;
pub use similar_asserts::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

/// Events a listener saw, in order
#[derive(Clone, Default)]
pub struct Seen(Rc<RefCell<Vec<Event>>>);

impl Seen {
    pub fn on_bus(bus: &EventBus, kind: &str) -> Self {
        let seen = Self::default();
        bus.subscribe(kind, seen.listener()).unwrap();
        seen
    }

    /// A listener that records into this log
    pub fn listener(&self) -> impl Fn(&Event) -> Result<(), HandlerError> + 'static {
        let sink = self.clone();
        move |event: &Event| {
            sink.push(event);
            Ok(())
        }
    }

    pub fn push(&self, event: &Event) {
        self.0.borrow_mut().push(event.clone());
    }

    pub fn on_store(store: &ObservableStore, kind: &str) -> Self {
        Self::on_bus(store.bus(), kind)
    }

    pub fn kinds(&self) -> Vec<String> {
        self.0.borrow().iter().map(|e| e.kind.clone()).collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A store holding `count = 0` and `double = count * 2`
pub fn counter(tasks: &TaskQueue) -> ObservableStore {
    let store = ObservableStore::new(tasks);
    store
        .initialize(
            StoreInit::new()
                .plain("count", json!(0))
                .computed("double", |s: &Scope<'_>| {
                    Ok(json!(s.get("count")?.as_i64().unwrap_or(0) * 2))
                }),
        )
        .unwrap();
    store
}
