//! Subscriber types for the reactive system.
//!
//! A Subscriber is a registered computation: an effect body, or the
//! recompute step of a computed cell.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::ReactiveContext;

/// Unique identifier for a subscriber.
///
/// Set membership in the dependency graph is by this ID, so registering the
/// same subscriber twice under one key is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A zero-argument callback re-run when one of its dependencies changes.
///
/// Cloning shares the callback and keeps the ID.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    callback: Rc<dyn Fn()>,
}

impl Subscriber {
    /// Create a new subscriber with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            id: SubscriberId::new(),
            callback: Rc::new(callback),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Run the callback with this subscriber active, so reads made during
    /// the run are recorded against it.
    ///
    /// The context is released on every exit path, including a panic in
    /// the callback.
    pub fn notify(&self) {
        let _ctx = ReactiveContext::enter(self.clone());
        (self.callback)();
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_notify_calls_callback() {
        let called = Rc::new(Cell::new(0));
        let called_clone = called.clone();

        let subscriber = Subscriber::new(move || {
            called_clone.set(called_clone.get() + 1);
        });

        assert_eq!(called.get(), 0);
        subscriber.notify();
        subscriber.notify();
        assert_eq!(called.get(), 2);
    }

    #[test]
    fn subscriber_is_active_while_notified() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();

        let subscriber = Subscriber::new(move || {
            seen_clone.set(ReactiveContext::current_subscriber_id());
        });
        subscriber.notify();

        assert_eq!(seen.get(), Some(subscriber.id()));
        assert!(!ReactiveContext::is_active());
    }

    #[test]
    fn clones_share_identity() {
        let subscriber = Subscriber::new(|| {});
        assert_eq!(subscriber.clone().id(), subscriber.id());
    }
}
