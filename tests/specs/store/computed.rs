//! Computed property specs
//!
//! Verify dependency capture and invalidation.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn count_and_double() {
    let tasks = TaskQueue::new();
    let store = counter(&tasks);
    let count_changes = Seen::on_store(&store, "change:count");
    let double_changes = Seen::on_store(&store, "change:double");

    store.set("count", 3).unwrap();

    assert_eq!(store.get("double").unwrap(), Some(json!(6)));
    assert_eq!(
        count_changes.events()[0].as_change(),
        Some(&Change::new("count", json!(3), json!(0)))
    );
    assert_eq!(
        double_changes.events()[0].as_change(),
        Some(&Change::invalidation("double"))
    );
}

#[test]
fn computed_values_are_not_assignable() {
    let tasks = TaskQueue::new();
    let store = counter(&tasks);

    assert!(store.set("double", 10).is_err());
    assert_eq!(store.get("double").unwrap(), Some(json!(0)));
}

#[test]
fn only_dependencies_invalidate() {
    let tasks = TaskQueue::new();
    let store = counter(&tasks);
    store.define("label", json!("x")).unwrap();
    let double_changes = Seen::on_store(&store, "change:double");

    store.set("label", "y").unwrap();
    assert!(double_changes.is_empty());

    store.set("count", 1).unwrap();
    assert_eq!(double_changes.len(), 1);
}

#[test]
fn later_getter_failure_is_reported_not_raised() {
    let tasks = TaskQueue::new();
    let store = counter(&tasks);
    store
        .define_computed("inverse", |s: &Scope<'_>| {
            let count = s.get("count")?.as_i64().unwrap_or(0);
            if count == 0 {
                Ok(json!(null))
            } else if count > 100 {
                Err(HandlerError::new("overflow"))
            } else {
                Ok(json!(1.0 / count as f64))
            }
        })
        .unwrap();
    let errors = Seen::on_store(&store, "__error__");

    store.set("count", 500).unwrap();

    assert_eq!(store.get("inverse").unwrap(), None);
    assert_eq!(errors.len(), 1);
}
