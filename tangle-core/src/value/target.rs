//! Raw composite targets.
//!
//! `Object` and `Array` are shared handles over caller-owned data. Cloning a
//! handle never copies the data, and every allocation carries an [`Identity`]
//! the dependency graph keys its entries by.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::{Key, Value};
use crate::error::{ReactiveError, Result};

/// Numeric identity of a target. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Token {
    id: TargetId,
}

/// Identity token owned by a target allocation.
///
/// The dependency graph holds only a weak reference to the token, so an
/// entry never keeps its target alive and can tell when it has gone.
#[derive(Debug, Clone)]
pub struct Identity(Rc<Token>);

impl Identity {
    pub fn new() -> Self {
        Self(Rc::new(Token { id: TargetId::next() }))
    }

    pub fn id(&self) -> TargetId {
        self.0.id
    }

    pub(crate) fn downgrade(&self) -> WeakIdentity {
        WeakIdentity(Rc::downgrade(&self.0))
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to an [`Identity`].
#[derive(Debug, Clone)]
pub(crate) struct WeakIdentity(Weak<Token>);

impl WeakIdentity {
    pub(crate) fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

struct ObjectInner {
    identity: Identity,
    frozen: Cell<bool>,
    entries: RefCell<IndexMap<Rc<str>, Value>>,
}

/// Raw object: named slots in insertion order.
#[derive(Clone)]
pub struct Object(Rc<ObjectInner>);

impl Object {
    pub fn new() -> Self {
        Self::from_entries(IndexMap::new())
    }

    fn from_entries(entries: IndexMap<Rc<str>, Value>) -> Self {
        Self(Rc::new(ObjectInner {
            identity: Identity::new(),
            frozen: Cell::new(false),
            entries: RefCell::new(entries),
        }))
    }

    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }

    /// The slot's value, or `Undefined` if absent.
    pub fn get(&self, name: &str) -> Value {
        self.0
            .entries
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.entries.borrow().contains_key(name)
    }

    /// Write a slot. Fails once the object is frozen.
    pub fn insert(&self, name: impl Into<Rc<str>>, value: impl Into<Value>) -> Result<()> {
        if self.is_frozen() {
            return Err(ReactiveError::Frozen("object"));
        }
        self.0.entries.borrow_mut().insert(name.into(), value.into());
        Ok(())
    }

    /// Remove a slot, returning its value. Removing an absent slot succeeds
    /// with `None` even when frozen.
    pub fn remove(&self, name: &str) -> Result<Option<Value>> {
        if !self.contains_key(name) {
            return Ok(None);
        }
        if self.is_frozen() {
            return Err(ReactiveError::Frozen("object"));
        }
        Ok(self.0.entries.borrow_mut().shift_remove(name))
    }

    /// Slot names in insertion order.
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject all further writes and deletes.
    pub fn freeze(&self) {
        self.0.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Rc<str>>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_entries(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

// Shallow on purpose: targets may contain themselves.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.identity().id().raw())
            .field("keys", &self.keys())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

struct ArrayInner {
    identity: Identity,
    frozen: Cell<bool>,
    // `None` marks a hole left by a delete.
    slots: RefCell<Vec<Option<Value>>>,
}

/// Largest length an [`Array`] may grow to. Writes at or past this index
/// fail with [`ReactiveError::InvalidKey`] instead of allocating.
pub const MAX_ARRAY_LEN: usize = 1 << 24;

/// Raw array: indexed slots, possibly with holes.
#[derive(Clone)]
pub struct Array(Rc<ArrayInner>);

impl Array {
    pub fn new() -> Self {
        Self::from_slots(Vec::new())
    }

    fn from_slots(slots: Vec<Option<Value>>) -> Self {
        Self(Rc::new(ArrayInner {
            identity: Identity::new(),
            frozen: Cell::new(false),
            slots: RefCell::new(slots),
        }))
    }

    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }

    /// The element at `index`, or `Undefined` for holes and out of range.
    pub fn get(&self, index: usize) -> Value {
        self.0
            .slots
            .borrow()
            .get(index)
            .cloned()
            .flatten()
            .unwrap_or_default()
    }

    /// Whether `index` is in range and not a hole.
    pub fn contains_index(&self, index: usize) -> bool {
        matches!(self.0.slots.borrow().get(index), Some(Some(_)))
    }

    /// Write an element, growing the array with holes if `index` is past
    /// the end. The resulting length may not exceed [`MAX_ARRAY_LEN`].
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        if self.is_frozen() {
            return Err(ReactiveError::Frozen("array"));
        }
        let Some(len) = index.checked_add(1).filter(|len| *len <= MAX_ARRAY_LEN) else {
            return Err(out_of_bounds(index));
        };
        let mut slots = self.0.slots.borrow_mut();
        if len > slots.len() {
            slots.resize(len, None);
        }
        slots[index] = Some(value.into());
        Ok(())
    }

    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        if self.is_frozen() {
            return Err(ReactiveError::Frozen("array"));
        }
        let mut slots = self.0.slots.borrow_mut();
        if slots.len() >= MAX_ARRAY_LEN {
            return Err(out_of_bounds(slots.len()));
        }
        slots.push(Some(value.into()));
        Ok(())
    }

    /// Punch a hole at `index`, returning the old element. The length is
    /// unchanged.
    pub fn remove(&self, index: usize) -> Result<Option<Value>> {
        if !self.contains_index(index) {
            return Ok(None);
        }
        if self.is_frozen() {
            return Err(ReactiveError::Frozen("array"));
        }
        Ok(self.0.slots.borrow_mut()[index].take())
    }

    /// Indices of present elements, skipping holes.
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .slots
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }

    /// Length including holes.
    pub fn len(&self) -> usize {
        self.0.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn freeze(&self) {
        self.0.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn out_of_bounds(index: usize) -> ReactiveError {
    ReactiveError::InvalidKey {
        key: index.to_string(),
        kind: "array",
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_slots(iter.into_iter().map(Some).collect())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("id", &self.identity().id().raw())
            .field("len", &self.len())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// A raw composite: the only thing a tracked view can wrap.
#[derive(Debug, Clone)]
pub enum Target {
    Object(Object),
    Array(Array),
}

impl Target {
    pub fn identity(&self) -> &Identity {
        match self {
            Target::Object(object) => object.identity(),
            Target::Array(array) => array.identity(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Object(_) => "object",
            Target::Array(_) => "array",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Target::Array(_))
    }

    /// Canonical form of `key` for this target: names on objects, indices on
    /// arrays where the key spells one.
    pub fn normalize_key(&self, key: Key) -> Key {
        match self {
            Target::Object(_) => match key {
                Key::Index(_) => Key::Name(key.to_name()),
                name => name,
            },
            Target::Array(_) => match key.as_index() {
                Some(index) => Key::Index(index),
                None => key,
            },
        }
    }

    /// Expects a key already passed through [`Target::normalize_key`].
    pub(crate) fn get(&self, key: &Key) -> Value {
        match (self, key) {
            (Target::Object(object), Key::Name(name)) => object.get(name),
            (Target::Array(array), Key::Index(index)) => array.get(*index),
            _ => Value::Undefined,
        }
    }

    pub(crate) fn has(&self, key: &Key) -> bool {
        match (self, key) {
            (Target::Object(object), Key::Name(name)) => object.contains_key(name),
            (Target::Array(array), Key::Index(index)) => array.contains_index(*index),
            _ => false,
        }
    }

    pub(crate) fn set(&self, key: &Key, value: Value) -> Result<()> {
        match (self, key) {
            (Target::Object(object), Key::Name(name)) => object.insert(Rc::clone(name), value),
            (Target::Array(array), Key::Index(index)) => array.set(*index, value),
            _ => Err(ReactiveError::InvalidKey {
                key: key.to_string(),
                kind: self.kind(),
            }),
        }
    }

    pub(crate) fn delete(&self, key: &Key) -> Result<()> {
        match (self, key) {
            (Target::Object(object), Key::Name(name)) => object.remove(name).map(drop),
            (Target::Array(array), Key::Index(index)) => array.remove(*index).map(drop),
            _ => Ok(()),
        }
    }

    /// Own keys in enumeration order.
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Target::Object(object) => object.keys().into_iter().map(Key::Name).collect(),
            Target::Array(array) => array.indices().into_iter().map(Key::Index).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::Object(object) => object.len(),
            Target::Array(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn freeze(&self) {
        match self {
            Target::Object(object) => object.freeze(),
            Target::Array(array) => array.freeze(),
        }
    }

    pub fn ptr_eq(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Object(a), Target::Object(b)) => a.ptr_eq(b),
            (Target::Array(a), Target::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Object> for Target {
    fn from(object: Object) -> Self {
        Target::Object(object)
    }
}

impl From<Array> for Target {
    fn from(array: Array) -> Self {
        Target::Array(array)
    }
}

impl TryFrom<Value> for Target {
    type Error = ReactiveError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Target::Object(object)),
            Value::Array(array) => Ok(Target::Array(array)),
            Value::Reactive(view) => Ok(view.to_raw()),
            other => Err(ReactiveError::NotComposite(other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_unique() {
        let a = Identity::new();
        let b = Identity::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn weak_identity_follows_owner() {
        let object = Object::new();
        let weak = object.identity().downgrade();
        assert!(weak.is_alive());

        drop(object);
        assert!(!weak.is_alive());
    }

    #[test]
    fn object_keeps_insertion_order() {
        let object = Object::new();
        object.insert("b", 1).unwrap();
        object.insert("a", 2).unwrap();
        object.insert("b", 3).unwrap();

        let keys: Vec<String> = object.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(object.get("b"), Value::Int(3));
        assert_eq!(object.get("missing"), Value::Undefined);
    }

    #[test]
    fn frozen_object_rejects_writes_but_not_absent_deletes() {
        let object: Object = [("a", Value::Int(1))].into_iter().collect();
        object.freeze();

        assert_eq!(object.insert("a", 2), Err(ReactiveError::Frozen("object")));
        assert_eq!(object.remove("a"), Err(ReactiveError::Frozen("object")));
        assert_eq!(object.remove("missing"), Ok(None));
        assert_eq!(object.get("a"), Value::Int(1));
    }

    #[test]
    fn array_delete_leaves_a_hole() {
        let array: Array = [1, 2, 3].into_iter().map(Value::from).collect();
        assert_eq!(array.remove(1).unwrap(), Some(Value::Int(2)));

        assert_eq!(array.len(), 3);
        assert!(!array.contains_index(1));
        assert_eq!(array.get(1), Value::Undefined);
        assert_eq!(array.indices(), vec![0, 2]);
    }

    #[test]
    fn array_grows_with_holes() {
        let array = Array::new();
        array.set(2, "x").unwrap();

        assert_eq!(array.len(), 3);
        assert_eq!(array.indices(), vec![2]);
    }

    #[test]
    fn array_rejects_indices_past_max_len() {
        let array: Array = [Value::Int(1)].into_iter().collect();

        for index in [usize::MAX, 1 << 40, MAX_ARRAY_LEN] {
            assert_eq!(
                array.set(index, 2),
                Err(ReactiveError::InvalidKey {
                    key: index.to_string(),
                    kind: "array"
                })
            );
        }
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(0), Value::Int(1));
    }

    #[test]
    fn huge_index_spelling_is_rejected_through_target() {
        let array = Target::from(Array::new());
        let key = array.normalize_key(Key::from("18446744073709551615"));
        assert_eq!(key, Key::from(usize::MAX));
        assert!(matches!(
            array.set(&key, Value::Int(2)),
            Err(ReactiveError::InvalidKey { kind: "array", .. })
        ));
        assert_eq!(array.len(), 0);
    }

    #[test]
    fn target_normalizes_keys_per_kind() {
        let object = Target::from(Object::new());
        let array = Target::from(Array::new());

        assert_eq!(object.normalize_key(Key::from(1usize)), Key::from("1"));
        assert_eq!(array.normalize_key(Key::from("1")), Key::from(1usize));
        assert_eq!(array.normalize_key(Key::from("x")), Key::from("x"));
    }

    #[test]
    fn named_keys_are_invalid_on_arrays() {
        let array = Target::from(Array::new());
        let err = array.set(&Key::from("x"), Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            ReactiveError::InvalidKey {
                key: "x".into(),
                kind: "array"
            }
        );
        assert_eq!(array.delete(&Key::from("x")), Ok(()));
    }

    #[test]
    fn scalars_are_not_targets() {
        let err = Target::try_from(Value::Int(3)).unwrap_err();
        assert_eq!(err, ReactiveError::NotComposite("int"));
    }
}
