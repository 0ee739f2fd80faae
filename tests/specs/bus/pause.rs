//! Pause/resume specs
//!
//! Pausing suppresses listeners but never the batched aggregation.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn paused_publishes_still_reach_the_batched_tier() {
    let tasks = TaskQueue::new();
    let bus = EventBus::new(&tasks);
    let seen = Seen::on_bus(&bus, "*");
    let drained = Seen::default();
    let sink = drained.clone();
    bus.set_after_events(move |events| events.iter().for_each(|e| sink.push(e)));

    bus.publish_sync("first");
    bus.pause();
    bus.publish_sync("second");
    bus.resume();
    bus.publish_sync("third");
    tasks.run_until_idle().unwrap();

    assert_eq!(seen.kinds(), vec!["first", "third"]);
    assert_eq!(drained.kinds(), vec!["first", "second", "third"]);
}

#[test]
fn paused_store_changes_still_produce_an_update() {
    let tasks = TaskQueue::new();
    let store = counter(&tasks);
    let changes = Seen::on_store(&store, CHANGE);
    let updates = Seen::on_store(&store, UPDATE);

    store.pause();
    store.set("count", 1).unwrap();
    store.set("count", 2).unwrap();
    store.resume();
    tasks.run_until_idle().unwrap();

    assert!(changes.is_empty());
    assert_eq!(updates.len(), 1);
    let update = updates.events().remove(0);
    let delta = &update.as_update().unwrap()["count"];
    assert_eq!(delta.former, Some(json!(0)));
    assert_eq!(delta.value, Some(json!(2)));
}
