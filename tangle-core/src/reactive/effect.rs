//! Effect Implementation
//!
//! An effect is a side-effecting computation that runs once immediately and
//! then again, synchronously, whenever a slot it read is written.
//!
//! # How Effects Work
//!
//! 1. [`effect`] registers the callback as a subscriber and runs it once
//!    with that subscriber active.
//!
//! 2. Every tracked read during a run adds an edge from the slot to the
//!    subscriber. Edges are never removed, so a dependency picked up on any
//!    run stays for the rest of the subscriber's life.
//!
//! 3. A changing write re-runs the callback, again with its own subscriber
//!    active, before the write returns. A slot first read on a re-run is
//!    therefore tracked too. A single "active effect" slot that is cleared
//!    after the first run would miss such reads and re-run fewer times.
//!
//! Effects cannot be disposed. An effect whose body writes a slot it reads
//! re-runs itself without bound.

use super::context::ReactiveContext;
use super::subscriber::Subscriber;

/// Register `callback` and run it once.
///
/// # Example
///
/// ```rust,ignore
/// let count = Ref::new(0);
/// let reader = count.clone();
///
/// effect(move || println!("count is {:?}", reader.value()));
///
/// count.set_value(5);  // Prints: "count is Int(5)"
/// ```
pub fn effect<F>(callback: F)
where
    F: Fn() + 'static,
{
    let subscriber = Subscriber::new(move || {
        callback();
        tracing::trace!(
            subscriber = ?ReactiveContext::current_subscriber_id(),
            reads = ReactiveContext::reads(),
            "effect run"
        );
    });

    tracing::debug!(subscriber = ?subscriber.id(), "effect registered");
    subscriber.notify();
}
