//! Bus delivery specs
//!
//! Verify ordering, failure and unsubscribe guarantees.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn throwing_listener_rejects_and_skips_the_rest() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    bus.subscribe("save", |_: &Event| Err(HandlerError::new("disk full")))
        .unwrap();
    let second = Seen::on_bus(&bus, "save");

    let mut delivery = bus.publish_sync("save");

    assert_eq!(
        delivery.try_result(),
        Some(Err(DeliveryError::Listener(HandlerError::new("disk full"))))
    );
    assert!(second.is_empty());
}

#[test]
fn deferred_deliveries_keep_publish_order() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    let seen = Seen::on_bus(&bus, "*");

    bus.publish("one");
    bus.publish("two");
    bus.publish_sync("three");
    assert_eq!(seen.kinds(), vec!["three"]);

    tasks.run_tick();
    assert_eq!(seen.kinds(), vec!["three", "one", "two"]);
}

#[test]
fn unsubscribed_handle_is_never_invoked_again() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    let seen = Seen::default();
    let off = bus.subscribe(["a", "b"], seen.listener()).unwrap();

    bus.publish_sync("a");
    off.unsubscribe();
    bus.publish("a");
    bus.publish_sync("b");
    tasks.run_until_idle().unwrap();
    off.unsubscribe();

    assert_eq!(seen.kinds(), vec!["a"]);
}

#[tokio::test]
async fn delivery_carries_the_targeted_event() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    Seen::on_bus(&bus, "ping");

    let delivery = bus.publish("ping");
    tasks.run_tick();
    let event = delivery.await.unwrap();

    assert_eq!(event.kind, "ping");
    assert_eq!(event.target.as_ref(), Some(bus.id()));
}

#[test]
fn disposed_bus_neither_delivers_nor_aggregates() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    let seen = Seen::on_bus(&bus, "*");
    let drained = Seen::default();
    let sink = drained.clone();
    bus.set_after_events(move |events| events.iter().for_each(|e| sink.push(e)));

    bus.publish("late");
    bus.dispose();
    tasks.run_until_idle().unwrap();

    assert!(seen.is_empty());
    assert!(drained.is_empty());
    let mut after = bus.publish_sync("later");
    assert_eq!(after.try_result(), Some(Err(DeliveryError::Disposed)));
}
