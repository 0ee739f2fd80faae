// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable properties with computed-property dependency tracking

mod pending;
mod property;
mod spy;
mod store;

pub use pending::{summarize, PendingChanges};
pub use property::{
    default_clone, default_equal, CloneFn, EqualFn, Getter, Initial, Producer, PropertyDef,
    PropertyKind, Scope, Validator,
};
pub use spy::DependencySpy;
pub use store::{ObservableStore, StoreInit};
