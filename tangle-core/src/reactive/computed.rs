//! Computed Cell Implementation
//!
//! A computed cell is a [`Ref`] whose value is kept equal to the result of a
//! getter. It is eager: the getter runs once on construction and again,
//! synchronously, every time one of the slots it read is written.
//!
//! # How Computed Cells Work
//!
//! 1. An empty ref is created.
//!
//! 2. An effect assigns `getter()` to the ref. Reads the getter makes are
//!    tracked against that effect.
//!
//! 3. When a dependency changes, the effect re-runs and reassigns. The ref
//!    only notifies its own dependents if the new result is strictly
//!    different from the old one.
//!
//! There is no cache invalidation or lazy recomputation: the stored value is
//! always the result of the most recent run.

use super::cell::Ref;
use super::effect::effect;
use crate::value::Value;

/// Create a ref kept in sync with `getter`.
///
/// # Example
///
/// ```rust,ignore
/// let a = Ref::new(1);
/// let b = Ref::new(2);
///
/// let (x, y) = (a.clone(), b.clone());
/// let sum = computed(move || {
///     x.value().as_int().unwrap_or(0) + y.value().as_int().unwrap_or(0)
/// });
///
/// a.set_value(10);
/// assert_eq!(sum.value(), Value::Int(12));
/// ```
pub fn computed<F, T>(getter: F) -> Ref
where
    F: Fn() -> T + 'static,
    T: Into<Value>,
{
    let result = Ref::empty();
    let cell = result.clone();
    effect(move || cell.set_value(getter()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sum_of(a: &Ref, b: &Ref) -> Ref {
        let (a, b) = (a.clone(), b.clone());
        computed(move || a.value().as_int().unwrap_or(0) + b.value().as_int().unwrap_or(0))
    }

    #[test]
    fn computed_has_initial_value() {
        let a = Ref::new(1);
        let b = Ref::new(2);
        assert_eq!(sum_of(&a, &b).value(), Value::Int(3));
    }

    #[test]
    fn computed_follows_dependencies() {
        let a = Ref::new(1);
        let b = Ref::new(2);
        let sum = sum_of(&a, &b);

        a.set_value(10);
        assert_eq!(sum.value_untracked(), Value::Int(12));

        b.set_value(20);
        assert_eq!(sum.value_untracked(), Value::Int(30));
    }

    #[test]
    fn getter_runs_once_per_change() {
        let source = Ref::new(1);
        let calls = Rc::new(Cell::new(0));
        let (reader, calls_clone) = (source.clone(), calls.clone());

        let doubled = computed(move || {
            calls_clone.set(calls_clone.get() + 1);
            reader.value().as_int().unwrap_or(0) * 2
        });
        assert_eq!(calls.get(), 1);

        source.set_value(1);
        assert_eq!(calls.get(), 1);

        source.set_value(4);
        assert_eq!(calls.get(), 2);
        assert_eq!(doubled.value(), Value::Int(8));
    }

    #[test]
    fn computed_notifies_its_own_dependents() {
        let a = Ref::new(1);
        let b = Ref::new(1);
        let sum = sum_of(&a, &b);

        let seen = Rc::new(Cell::new(0));
        let runs = Rc::new(Cell::new(0));
        let (reader, seen_clone, runs_clone) = (sum.clone(), seen.clone(), runs.clone());
        effect(move || {
            seen_clone.set(reader.value().as_int().unwrap_or(-1));
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!((seen.get(), runs.get()), (2, 1));

        a.set_value(5);
        assert_eq!((seen.get(), runs.get()), (6, 2));
    }

    #[test]
    fn unchanged_result_does_not_notify() {
        let n = Ref::new(1);
        let reader = n.clone();
        let positive = computed(move || reader.value().as_int().unwrap_or(0) > 0);

        let runs = Rc::new(Cell::new(0));
        let (watched, runs_clone) = (positive.clone(), runs.clone());
        effect(move || {
            watched.value();
            runs_clone.set(runs_clone.get() + 1);
        });

        n.set_value(7);
        assert_eq!(runs.get(), 1);

        n.set_value(-1);
        assert_eq!(runs.get(), 2);
        assert_eq!(positive.value(), Value::Bool(false));
    }

    #[test]
    fn computed_chains() {
        let base = Ref::new(5);
        let reader = base.clone();
        let doubled = computed(move || reader.value().as_int().unwrap_or(0) * 2);
        let doubled_reader = doubled.clone();
        let plus_ten = computed(move || doubled_reader.value().as_int().unwrap_or(0) + 10);

        assert_eq!(plus_ten.value(), Value::Int(20));

        base.set_value(10);
        assert_eq!(doubled.value(), Value::Int(20));
        assert_eq!(plus_ten.value(), Value::Int(30));
    }
}
