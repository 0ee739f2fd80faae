//! Batching specs
//!
//! Verify flush counts and the per-tick update summary.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn pair(tasks: &TaskQueue) -> ObservableStore {
    let store = ObservableStore::new(tasks);
    store
        .initialize(StoreInit::new().plain("a", json!(0)).plain("b", json!(0)))
        .unwrap();
    store
}

#[test]
fn set_many_yields_one_changes_and_one_update() {
    let tasks = TaskQueue::new();
    let store = pair(&tasks);
    let changes = Seen::on_store(&store, CHANGES);
    let updates = Seen::on_store(&store, UPDATE);

    store.set_many([("a", 1), ("b", 2)]).unwrap();
    tasks.run_until_idle().unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes.events()[0].as_changes().unwrap().to_vec(),
        vec![
            Change::new("a", json!(1), json!(0)),
            Change::new("b", json!(2), json!(0)),
        ]
    );
    assert_eq!(updates.len(), 1);
    let names: Vec<String> = updates.events()[0]
        .as_update()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn separate_sets_flush_separately_but_update_once() {
    let tasks = TaskQueue::new();
    let store = pair(&tasks);
    let changes = Seen::on_store(&store, CHANGES);
    let updates = Seen::on_store(&store, UPDATE);

    store.set("a", 1).unwrap();
    store.set("b", 1).unwrap();
    tasks.run_until_idle().unwrap();

    assert_eq!(changes.len(), 2);
    assert_eq!(updates.len(), 1);
}

#[test]
fn idempotent_writes_publish_nothing() {
    let tasks = TaskQueue::new();
    let store = pair(&tasks);
    let everything = Seen::on_store(&store, "*");

    store.set("a", 0).unwrap();
    store.set_many([("a", 0), ("b", 0)]).unwrap();
    tasks.run_until_idle().unwrap();

    assert!(everything.is_empty());
    assert!(store.pending_changes().is_empty());
}

#[test]
fn explicit_action_brackets_writes() {
    let tasks = TaskQueue::new();
    let store = pair(&tasks);
    let changes = Seen::on_store(&store, CHANGES);

    store.begin_action();
    store.set("a", 5).unwrap();
    store.set("a", 6).unwrap();
    store.set("b", 1).unwrap();
    assert!(changes.is_empty());
    store.end_action().unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes.events()[0].as_changes().unwrap()[0],
        Change::new("a", json!(6), json!(0))
    );
}
