//! Reactive Primitives
//!
//! This module implements the reactive system: tracked views, effects, ref
//! cells and computed cells.
//!
//! # Concepts
//!
//! ## Tracked views
//!
//! A [`Reactive`] wraps a raw object or array. Reading a slot inside a
//! running effect records the effect as a dependent of that slot; writing a
//! different value, or deleting an existing slot, re-runs every dependent.
//!
//! ## Refs
//!
//! A [`Ref`] is a reactive cell with a single `value` slot. [`to_refs`]
//! projects each key of a view into a [`ProxyRef`] of the same shape.
//!
//! ## Effects and computed cells
//!
//! [`effect`] runs a callback now and again whenever something it read
//! changes. [`computed`] is a ref kept in sync with a getter by an effect.
//!
//! # Implementation Notes
//!
//! Dependencies live in a thread-local graph keyed by raw target identity
//! (see [`track`] and [`trigger`]). The running subscriber is found through a
//! thread-local context stack. Everything is `Rc` based and re-runs happen
//! synchronously inside the write that caused them; nothing here is `Send`.

mod cell;
mod computed;
mod context;
mod effect;
mod graph;
mod proxy;
mod refs;
mod subscriber;

pub use cell::{make_ref, Ref, RefLike};
pub use computed::computed;
pub use context::ReactiveContext;
pub use effect::effect;
pub use graph::{subscriber_count, target_count, track, trigger, Trackable};
pub use proxy::{reactive, Reactive};
pub use refs::{to_refs, ProxyRef, Refs};
pub use subscriber::{Subscriber, SubscriberId};
