//! Tangle Core
//!
//! Fine-grained reactive dependency tracking over plain composite values.
//! Reads made while a registered computation runs are recorded as
//! dependencies; later writes to the same slot re-run every computation that
//! read it, synchronously, before the write returns.
//!
//! # Architecture
//!
//! - `value`: the dynamic [`Value`] model and raw targets ([`Object`],
//!   [`Array`])
//! - `reactive`: the dependency graph, effect context, tracked views, ref
//!   cells, ref projection and computed cells
//! - `error`: failures surfaced from writes on raw targets
//!
//! The engine is single-threaded. Its graph and context are thread-local,
//! and all handles are `Rc` based.
//!
//! # Example
//!
//! ```rust,ignore
//! use tangle_core::{effect, reactive, Object, Value};
//!
//! let state = reactive(Object::from_iter([("count", Value::Int(0))]));
//!
//! let reader = state.clone();
//! effect(move || println!("count: {:?}", reader.get("count")));
//!
//! state.set("count", 1)?;
//! // Effect re-ran before `set` returned, printing "count: Int(1)"
//! ```

pub mod error;
pub mod reactive;
pub mod value;

pub use error::{ReactiveError, Result};
pub use reactive::{
    computed, effect, make_ref, reactive, to_refs, track, trigger, ProxyRef, Reactive, Ref,
    RefLike, Refs, Trackable,
};
pub use value::{Array, Key, Object, Target, Value};
