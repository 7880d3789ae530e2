//! Ref projection: one cell-shaped handle per key of a tracked view.

use std::rc::Rc;

use indexmap::IndexMap;

use super::cell::RefLike;
use super::proxy::Reactive;
use crate::error::Result;
use crate::value::{Key, Value};

/// Forwards `value` reads and writes to one key of a tracked view.
///
/// Holds no dependency state of its own: tracking and triggering happen in
/// the view it forwards to.
#[derive(Debug, Clone)]
pub struct ProxyRef {
    source: Reactive,
    key: Key,
}

impl ProxyRef {
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn value(&self) -> Value {
        self.source.get(self.key.clone())
    }

    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        self.source.set(self.key.clone(), value)
    }
}

impl RefLike for ProxyRef {
    fn value(&self) -> Value {
        ProxyRef::value(self)
    }

    fn set_value(&self, value: Value) -> Result<()> {
        ProxyRef::set_value(self, value)
    }
}

/// The container [`to_refs`] returns, shaped like the projected view.
#[derive(Debug, Clone)]
pub enum Refs {
    /// Same length as the array; holes stay `None`.
    Array(Vec<Option<ProxyRef>>),
    Object(IndexMap<Rc<str>, ProxyRef>),
}

impl Refs {
    /// The entry for `key`, if it was enumerable when projected.
    pub fn get(&self, key: impl Into<Key>) -> Option<&ProxyRef> {
        let key = key.into();
        match self {
            Refs::Array(entries) => entries.get(key.as_index()?)?.as_ref(),
            Refs::Object(entries) => entries.get(&*key.to_name()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Refs::Array(entries) => entries.len(),
            Refs::Object(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Project every key `wrapped` has right now into a forwarding cell.
///
/// Keys added later are not reflected: the key set is a snapshot, the values
/// are live.
pub fn to_refs(wrapped: &Reactive) -> Refs {
    let entry = |key: Key| ProxyRef {
        source: wrapped.clone(),
        key,
    };

    if wrapped.is_array() {
        let mut entries = vec![None; wrapped.len()];
        for key in wrapped.keys() {
            if let Some(index) = key.as_index() {
                entries[index] = Some(entry(key));
            }
        }
        Refs::Array(entries)
    } else {
        Refs::Object(
            wrapped
                .keys()
                .into_iter()
                .map(|key| (key.to_name(), entry(key)))
                .collect(),
        )
    }
}
