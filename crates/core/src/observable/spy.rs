// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency capture for computed properties
//!
//! A fresh spy is armed for each computed property's initializing
//! evaluation and threaded through every read that evaluation performs.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpy {
    active: bool,
    target: String,
    running: Option<String>,
    found: BTreeSet<String>,
}

impl DependencySpy {
    /// Arm a spy for the computed property `target`
    pub fn begin_capture(target: impl Into<String>) -> Self {
        Self {
            active: true,
            target: target.into(),
            running: None,
            found: BTreeSet::new(),
        }
    }

    /// Disarm and hand back the captured names
    pub fn end_capture(&mut self) -> BTreeSet<String> {
        self.active = false;
        std::mem::take(&mut self.found)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn found(&self) -> &BTreeSet<String> {
        &self.found
    }

    /// Mark which getter is executing. Returns the previous one so nested
    /// computed reads can restore it.
    pub fn set_running_getter(&mut self, name: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.running, name)
    }

    /// Record a property read
    ///
    /// Only reads made directly by the target's own getter count, and the
    /// target never depends on itself.
    pub fn record_read(&mut self, name: &str) {
        if self.active
            && name != self.target
            && self.running.as_deref() == Some(self.target.as_str())
        {
            self.found.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_reads_made_by_target_getter() {
        let mut spy = DependencySpy::begin_capture("total");
        spy.set_running_getter(Some("total".into()));
        spy.record_read("a");
        spy.record_read("b");
        spy.record_read("a");

        let found = spy.end_capture();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!spy.is_active());
    }

    #[test]
    fn ignores_reads_before_getter_runs() {
        let mut spy = DependencySpy::begin_capture("total");
        spy.record_read("a");
        assert!(spy.found().is_empty());
    }

    #[test]
    fn ignores_self_reads() {
        let mut spy = DependencySpy::begin_capture("total");
        spy.set_running_getter(Some("total".into()));
        spy.record_read("total");
        assert!(spy.found().is_empty());
    }

    #[test]
    fn nested_getter_reads_are_not_attributed_to_target() {
        let mut spy = DependencySpy::begin_capture("total");
        spy.set_running_getter(Some("total".into()));
        spy.record_read("double");

        let outer = spy.set_running_getter(Some("double".into()));
        spy.record_read("count");
        spy.set_running_getter(outer);

        spy.record_read("offset");
        let found = spy.end_capture();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["double", "offset"]);
    }

    #[test]
    fn disarmed_spy_records_nothing() {
        let mut spy = DependencySpy::begin_capture("total");
        spy.set_running_getter(Some("total".into()));
        spy.end_capture();
        spy.record_read("a");
        assert!(spy.found().is_empty());
        assert_eq!(spy.target(), "total");
    }
}
