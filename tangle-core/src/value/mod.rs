//! Dynamic values
//!
//! Reactive targets are key/value bags rather than typed structs, so every
//! slot holds a [`Value`]. Scalars compare by content, composites and cells
//! by handle identity, mirroring strict equality: two handles are equal only
//! when they point at the same allocation.

pub(crate) mod target;

use std::fmt;
use std::rc::Rc;

use crate::reactive::{Reactive, Ref};

pub use target::{Array, Identity, Object, Target, TargetId, MAX_ARRAY_LEN};

/// Key addressing one slot of a target.
///
/// Objects are keyed by name and arrays by index. Keys are normalized by the
/// target before they reach the dependency graph, so `"0"` and `0` address
/// the same array slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Named property.
    Name(Rc<str>),
    /// Array index.
    Index(usize),
}

impl Key {
    /// The synthetic key ref cells track their single slot under.
    pub fn value() -> Self {
        Key::Name(Rc::from("value"))
    }

    /// The index this key addresses, if it is an index or the canonical
    /// decimal spelling of one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(name) => {
                let index = name.parse::<usize>().ok()?;
                (index.to_string() == **name).then_some(index)
            }
        }
    }

    /// The property name this key addresses.
    pub fn to_name(&self) -> Rc<str> {
        match self {
            Key::Name(name) => Rc::clone(name),
            Key::Index(index) => Rc::from(index.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<Rc<str>> for Key {
    fn from(name: Rc<str>) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// A value stored in a target slot or a ref cell.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent slot, or an empty ref cell.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Raw object, untracked.
    Object(Object),
    /// Raw array, untracked.
    Array(Array),
    /// Tracked view over a raw object or array.
    Reactive(Reactive),
    /// Ref cell handle.
    Ref(Ref),
}

impl Value {
    /// Strict equality.
    ///
    /// Numbers compare numerically across `Int` and `Float` (so `NaN` never
    /// equals itself), strings by content, and everything else by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Reactive(a), Value::Reactive(b)) => a.ptr_eq(b),
            (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Whether this value is keyed and mutable: a raw composite or a view
    /// over one.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_) | Value::Reactive(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Reactive(_) => "reactive",
            Value::Ref(_) => "ref",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// The tracked view, if this value is one.
    pub fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            Value::Reactive(r) => Some(r),
            _ => None,
        }
    }

    /// The ref cell, if this value is one.
    pub fn as_ref_cell(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Raw composites become a fresh tracked view; everything else passes
    /// through unchanged.
    pub(crate) fn wrap_if_composite(self) -> Value {
        match self {
            Value::Object(object) => Value::Reactive(Reactive::new(object)),
            Value::Array(array) => Value::Reactive(Reactive::new(array)),
            other => other,
        }
    }

    /// Tracked views are replaced by their raw target.
    pub(crate) fn into_raw(self) -> Value {
        match self {
            Value::Reactive(view) => view.to_raw().into(),
            other => other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Object(object) => fmt::Debug::fmt(object, f),
            Value::Array(array) => fmt::Debug::fmt(array, f),
            Value::Reactive(view) => fmt::Debug::fmt(view, f),
            Value::Ref(cell) => fmt::Debug::fmt(cell, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Target> for Value {
    fn from(target: Target) -> Self {
        match target {
            Target::Object(object) => Value::Object(object),
            Target::Array(array) => Value::Array(array),
        }
    }
}

impl From<Reactive> for Value {
    fn from(view: Reactive) -> Self {
        Value::Reactive(view)
    }
}

impl From<Ref> for Value {
    fn from(cell: Ref) -> Self {
        Value::Ref(cell)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a fresh raw tree from a JSON literal.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
