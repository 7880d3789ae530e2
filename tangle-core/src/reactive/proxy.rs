//! Tracked views over raw composites.
//!
//! A [`Reactive`] routes every access to its raw target through the
//! dependency graph: reads [`track`], changing writes and successful deletes
//! [`trigger`]. Dependencies are keyed by the raw target's identity, never by
//! the view's, so any number of views over one raw value observe each other.
//!
//! Nested composites are wrapped on read, and each read builds a fresh view:
//! two reads of the same nested slot return views that are not `ptr_eq`,
//! although both track against the same raw target.

use std::fmt;
use std::rc::Rc;

use super::graph::{track, trigger, Trackable};
use crate::error::{ReactiveError, Result};
use crate::value::{Array, Identity, Key, Object, Target, Value};

/// Tracked view over an object or array.
///
/// Cloning shares the view; [`Reactive::ptr_eq`] compares view identity.
#[derive(Clone)]
pub struct Reactive {
    target: Rc<Target>,
}

impl Reactive {
    /// Wrap a raw target. The target is shared, not copied.
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: Rc::new(target.into()),
        }
    }

    /// Read a slot, recording it as a dependency of the running subscriber.
    ///
    /// Composites come back as a fresh [`Value::Reactive`]; absent slots read
    /// as [`Value::Undefined`].
    pub fn get(&self, key: impl Into<Key>) -> Value {
        let key = self.target.normalize_key(key.into());
        track(self, key.clone());
        self.target.get(&key).wrap_if_composite()
    }

    /// Write a slot, notifying its dependents if the value changed.
    ///
    /// A view is stored as its raw target. When the new value is strictly
    /// equal to the current one nothing is written and nobody is notified.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = self.target.normalize_key(key.into());
        let value = value.into().into_raw();

        if self.target.get(&key).strict_eq(&value) {
            return Ok(());
        }
        self.target.set(&key, value)?;
        trigger(self, key);
        Ok(())
    }

    /// Delete a slot. Dependents are notified only if the slot existed and
    /// the delete succeeded; deleting an absent slot is a silent success.
    pub fn delete(&self, key: impl Into<Key>) -> Result<()> {
        let key = self.target.normalize_key(key.into());
        let existed = self.target.has(&key);

        self.target.delete(&key)?;
        if existed {
            trigger(self, key);
        }
        Ok(())
    }

    /// Own keys at this moment, in enumeration order. Enumeration is not
    /// tracked.
    pub fn keys(&self) -> Vec<Key> {
        self.target.keys()
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.target.is_array()
    }

    /// The raw target, for untracked access.
    pub fn to_raw(&self) -> Target {
        (*self.target).clone()
    }

    /// Freeze the raw target; later writes and deletes through any view fail.
    pub fn freeze(&self) {
        self.target.freeze();
    }

    /// Whether both handles are the same view.
    pub fn ptr_eq(&self, other: &Reactive) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }

    /// Whether both views wrap the same raw target.
    pub fn same_target(&self, other: &Reactive) -> bool {
        self.target.ptr_eq(&other.target)
    }
}

impl Trackable for Reactive {
    fn identity(&self) -> &Identity {
        self.target.identity()
    }
}

impl Trackable for Target {
    fn identity(&self) -> &Identity {
        Target::identity(self)
    }
}

impl Trackable for Object {
    fn identity(&self) -> &Identity {
        Object::identity(self)
    }
}

impl Trackable for Array {
    fn identity(&self) -> &Identity {
        Array::identity(self)
    }
}

impl TryFrom<Value> for Reactive {
    type Error = ReactiveError;

    /// Views pass through unchanged; raw composites are wrapped; scalars are
    /// rejected with [`ReactiveError::NotComposite`].
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Reactive(view) => Ok(view),
            other => Target::try_from(other).map(Reactive::new),
        }
    }
}

impl fmt::Debug for Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reactive").field(&*self.target).finish()
    }
}

/// Wrap a raw object or array in a tracked view.
///
/// Non-composite input cannot be expressed; convert a [`Value`] with
/// [`Reactive::try_from`] to get a [`ReactiveError::NotComposite`] instead.
pub fn reactive(target: impl Into<Target>) -> Reactive {
    Reactive::new(target)
}
