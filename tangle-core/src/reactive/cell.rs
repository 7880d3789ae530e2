//! Ref Cell Implementation
//!
//! A [`Ref`] holds a single value behind one logical slot named `value`.
//! The cell's own identity is its key in the dependency graph, so it tracks
//! and triggers exactly like a one-key tracked view.
//!
//! # How Refs Work
//!
//! 1. Reading [`Ref::value`] inside a running subscriber registers it
//!    against `(cell, "value")`.
//!
//! 2. Writing a strictly different value through [`Ref::set_value`] stores
//!    it and re-runs every registered subscriber.
//!
//! 3. Raw composites stored in a ref are wrapped in a tracked view, so reads
//!    through the contained value are tracked as well.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::graph::{track, trigger, Trackable};
use crate::error::Result;
use crate::value::{Identity, Key, Value};

/// Shared shape of [`Ref`] and projection entries: one readable, writable
/// `value` slot.
pub trait RefLike {
    /// Read the slot.
    fn value(&self) -> Value;

    /// Write the slot.
    fn set_value(&self, value: Value) -> Result<()>;
}

struct RefInner {
    identity: Identity,
    value: RefCell<Value>,
}

/// A reactive cell holding one value.
///
/// Cloning shares the cell. There is no way to unsubscribe: subscribers
/// registered against a cell stay registered for as long as it lives.
#[derive(Clone)]
pub struct Ref(Rc<RefInner>);

impl Ref {
    /// Create a cell holding `value`, wrapping it if it is a raw composite.
    ///
    /// Unlike [`make_ref`], a ref passed here is stored as the value of a
    /// new, outer cell.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Rc::new(RefInner {
            identity: Identity::new(),
            value: RefCell::new(value.into().wrap_if_composite()),
        }))
    }

    /// Create a cell holding `Undefined`.
    pub fn empty() -> Self {
        Self::new(Value::Undefined)
    }

    /// Read the value, registering the running subscriber as a dependent.
    pub fn value(&self) -> Value {
        track(self, Key::value());
        self.0.value.borrow().clone()
    }

    /// Read the value without tracking.
    pub fn value_untracked(&self) -> Value {
        self.0.value.borrow().clone()
    }

    /// Store a new value and notify dependents, unless it is strictly equal
    /// to the current one.
    pub fn set_value(&self, value: impl Into<Value>) {
        let value = value.into();
        {
            let mut slot = self.0.value.borrow_mut();
            if slot.strict_eq(&value) {
                return;
            }
            *slot = value.wrap_if_composite();
        }
        trigger(self, Key::value());
    }

    /// Update the value from the current one. The read is untracked; the
    /// write notifies like [`Ref::set_value`].
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let next = f(&self.value_untracked());
        self.set_value(next);
    }

    /// Whether both handles are the same cell.
    pub fn ptr_eq(&self, other: &Ref) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl RefLike for Ref {
    fn value(&self) -> Value {
        Ref::value(self)
    }

    fn set_value(&self, value: Value) -> Result<()> {
        Ref::set_value(self, value);
        Ok(())
    }
}

impl Trackable for Ref {
    fn identity(&self) -> &Identity {
        &self.0.identity
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("id", &self.0.identity.id().raw())
            .field("holds", &self.0.value.borrow().type_name())
            .finish()
    }
}

/// Create a ref cell from `raw`.
///
/// Returns `None` when `raw` already is a ref cell: the existing cell is
/// neither returned nor wrapped again.
pub fn make_ref(raw: impl Into<Value>) -> Option<Ref> {
    match raw.into() {
        Value::Ref(existing) => {
            tracing::debug!(?existing, "make_ref called with a ref; returning none");
            None
        }
        value => Some(Ref::new(value)),
    }
}
