// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disposal state shared between an object and the parts it owns

use std::cell::Cell;
use std::rc::Rc;

/// Something that can be torn down exactly once
pub trait Disposable {
    fn is_disposed(&self) -> bool;
    fn dispose(&self);
}

/// Shared disposal flag
///
/// Clones observe the same flag, so a store and the bus it owns agree on
/// whether the object is still alive.
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    disposed: Rc<Cell<bool>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag. Returns false if it was already set.
    pub fn mark_disposed(&self) -> bool {
        !self.disposed.replace(true)
    }
}

impl Disposable for Lifecycle {
    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn dispose(&self) {
        self.mark_disposed();
    }
}
