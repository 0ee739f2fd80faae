// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-change aggregation and per-tick change summaries

use crate::events::{Change, Delta, Event, CHANGE};
use std::collections::BTreeMap;

/// Changes waiting for the next flush, at most one per name
///
/// The first recorded `former` is kept; later writes to the same name only
/// replace `value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    changes: Vec<Change>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. Returns true if `name` was not pending yet.
    pub fn record(&mut self, change: Change) -> bool {
        match self.changes.iter_mut().find(|c| c.name == change.name) {
            Some(existing) => {
                if change.value.is_some() {
                    existing.value = change.value;
                }
                false
            }
            None => {
                self.changes.push(change);
                true
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changes.iter().any(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn as_slice(&self) -> &[Change] {
        &self.changes
    }

    /// Remove and return everything, in insertion order
    pub fn take(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

/// Fold `change` events into one delta per name
///
/// The first `former` seen for a name wins, the last `value` wins.
pub fn summarize<'a>(events: impl IntoIterator<Item = &'a Event>) -> BTreeMap<String, Delta> {
    let mut summary: BTreeMap<String, Delta> = BTreeMap::new();
    for event in events {
        if event.kind != CHANGE {
            continue;
        }
        let Some(change) = event.as_change() else {
            continue;
        };
        match summary.get_mut(&change.name) {
            Some(delta) => delta.value = change.value.clone(),
            None => {
                summary.insert(
                    change.name.clone(),
                    Delta {
                        value: change.value.clone(),
                        former: change.former.clone(),
                    },
                );
            }
        }
    }
    summary
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
