//! Reactive Context
//!
//! The reactive context tracks which subscriber is currently running.
//! This enables automatic dependency tracking: when a tracked slot is read,
//! the current subscriber is registered as its dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack. Running a subscriber pushes it; the guard
//! returned by [`ReactiveContext::enter`] pops it when dropped, including
//! during unwinding. Nested runs therefore attribute reads to the innermost
//! subscriber, and the outer one becomes current again once the inner run
//! returns.
//!
//! Each entry also counts the tracked reads of its run. The count is
//! diagnostics only: it feeds the `effect run` trace event and never
//! affects which subscribers are registered.

use std::cell::RefCell;

use super::subscriber::{Subscriber, SubscriberId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = RefCell::new(Vec::new());
}

/// An entry in the reactive context stack.
#[derive(Debug)]
struct ContextEntry {
    subscriber: Subscriber,
    /// Tracked reads during this run, reported by tracing.
    reads: usize,
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given subscriber.
    ///
    /// While this context is active, tracked reads register the subscriber
    /// as a dependent. The context is exited when the guard is dropped.
    pub fn enter(subscriber: Subscriber) -> Self {
        let subscriber_id = subscriber.id();
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber,
                reads: 0,
            });
        });

        Self { subscriber_id }
    }

    /// Check if there is an active reactive context.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The subscriber currently running, if any.
    pub fn current_subscriber() -> Option<Subscriber> {
        CONTEXT_STACK.with(|stack| {
            stack.borrow().last().map(|entry| entry.subscriber.clone())
        })
    }

    pub fn current_subscriber_id() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|entry| entry.subscriber.id()))
    }

    /// Count a tracked read against the current run.
    pub(crate) fn record_read() {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                entry.reads += 1;
            }
        });
    }

    /// Tracked reads made so far by the current run.
    pub fn reads() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map_or(0, |entry| entry.reads))
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber.id(),
                    self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id,
                    entry.subscriber.id()
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tracks_subscriber() {
        let subscriber = Subscriber::new(|| {});
        let id = subscriber.id();

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());

        {
            let _ctx = ReactiveContext::enter(subscriber);

            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_subscriber_id(), Some(id));
        }

        // Context should be cleaned up after drop
        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn context_counts_reads() {
        let _ctx = ReactiveContext::enter(Subscriber::new(|| {}));

        ReactiveContext::record_read();
        ReactiveContext::record_read();
        ReactiveContext::record_read();

        assert_eq!(ReactiveContext::reads(), 3);
    }

    #[test]
    fn nested_contexts() {
        let outer = Subscriber::new(|| {});
        let inner = Subscriber::new(|| {});
        let (id1, id2) = (outer.id(), inner.id());

        {
            let _ctx1 = ReactiveContext::enter(outer);
            ReactiveContext::record_read();
            assert_eq!(ReactiveContext::current_subscriber_id(), Some(id1));

            {
                let _ctx2 = ReactiveContext::enter(inner);
                assert_eq!(ReactiveContext::current_subscriber_id(), Some(id2));
                assert_eq!(ReactiveContext::reads(), 0);
            }

            // After inner context drops, outer should be current
            assert_eq!(ReactiveContext::current_subscriber_id(), Some(id1));
            assert_eq!(ReactiveContext::reads(), 1);
        }

        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn context_is_released_on_panic() {
        let result = std::panic::catch_unwind(|| {
            let _ctx = ReactiveContext::enter(Subscriber::new(|| {}));
            panic!("boom");
        });

        assert!(result.is_err());
        assert!(!ReactiveContext::is_active());
    }
}
