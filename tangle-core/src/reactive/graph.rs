//! Dependency Graph
//!
//! Maps a raw target's identity to, per key, the ordered set of subscribers
//! that read that key. This is pure bookkeeping: [`track`] inserts an edge
//! for the running subscriber, [`trigger`] re-runs everything registered
//! under a key.
//!
//! # Lifetime of entries
//!
//! Entries are keyed by [`TargetId`], which is never reused, and hold only a
//! weak reference to the target's identity token. An entry therefore never
//! keeps its target alive. Entries whose target has been dropped are pruned
//! whenever the table has grown past its last high-water mark.
//!
//! # Reentrancy
//!
//! Subscribers are snapshotted before they run, so a subscriber may freely
//! track and trigger during its run. There is no cycle guard: a subscriber
//! that writes a slot it depends on re-runs itself until the stack runs out.

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::context::ReactiveContext;
use super::subscriber::{Subscriber, SubscriberId};
use crate::value::{target::WeakIdentity, Identity, Key, TargetId};

/// Table size below which dead entries are left alone.
const PRUNE_FLOOR: usize = 64;

thread_local! {
    static GRAPH: RefCell<DependencyGraph> = RefCell::new(DependencyGraph::new());
}

/// Anything with an identity the graph can key dependencies by.
///
/// Tracked views resolve to their raw target, so every view over the same
/// raw value shares one set of dependencies.
pub trait Trackable {
    fn identity(&self) -> &Identity;
}

struct TargetDeps {
    owner: WeakIdentity,
    keys: HashMap<Key, IndexMap<SubscriberId, Subscriber>>,
}

struct DependencyGraph {
    targets: HashMap<TargetId, TargetDeps>,
    prune_at: usize,
}

impl DependencyGraph {
    fn new() -> Self {
        Self {
            targets: HashMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }

    fn insert(&mut self, identity: &Identity, key: Key, subscriber: Subscriber) -> bool {
        if !self.targets.contains_key(&identity.id()) {
            self.prune();
        }

        let deps = self
            .targets
            .entry(identity.id())
            .or_insert_with(|| TargetDeps {
                owner: identity.downgrade(),
                keys: HashMap::new(),
            });

        let set = deps.keys.entry(key).or_default();
        if set.contains_key(&subscriber.id()) {
            return false;
        }
        set.insert(subscriber.id(), subscriber);
        true
    }

    fn subscribers(&self, id: TargetId, key: &Key) -> SmallVec<[Subscriber; 4]> {
        self.targets
            .get(&id)
            .and_then(|deps| deps.keys.get(key))
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    fn prune(&mut self) {
        if self.targets.len() < self.prune_at {
            return;
        }

        let before = self.targets.len();
        self.targets.retain(|_, deps| deps.owner.is_alive());
        self.prune_at = (self.targets.len() * 2).max(PRUNE_FLOOR);

        tracing::debug!(
            removed = before - self.targets.len(),
            live = self.targets.len(),
            "pruned dependency graph"
        );
    }
}

/// Record that the running subscriber depends on `key` of `target`.
///
/// Does nothing outside a running subscriber. Repeated reads of the same
/// slot by the same subscriber register it once.
pub fn track<T>(target: &T, key: impl Into<Key>)
where
    T: Trackable + ?Sized,
{
    let Some(subscriber) = ReactiveContext::current_subscriber() else {
        return;
    };
    let key = key.into();
    let identity = target.identity();

    ReactiveContext::record_read();
    let subscriber_id = subscriber.id();
    let added = GRAPH.with(|graph| graph.borrow_mut().insert(identity, key.clone(), subscriber));

    if added {
        tracing::trace!(
            target_id = identity.id().raw(),
            %key,
            subscriber = ?subscriber_id,
            "track"
        );
    }
}

/// Re-run every subscriber registered under `key` of `target`.
///
/// Subscribers run synchronously in registration order, each once, before
/// this returns.
pub fn trigger<T>(target: &T, key: impl Into<Key>)
where
    T: Trackable + ?Sized,
{
    let key = key.into();
    let id = target.identity().id();
    let subscribers = GRAPH.with(|graph| graph.borrow().subscribers(id, &key));

    if subscribers.is_empty() {
        return;
    }
    tracing::trace!(
        target_id = id.raw(),
        %key,
        count = subscribers.len(),
        "trigger"
    );

    for subscriber in subscribers {
        subscriber.notify();
    }
}

/// Number of subscribers registered under `key` of `target`.
pub fn subscriber_count<T>(target: &T, key: impl Into<Key>) -> usize
where
    T: Trackable + ?Sized,
{
    let key = key.into();
    let id = target.identity().id();
    GRAPH.with(|graph| {
        graph
            .borrow()
            .targets
            .get(&id)
            .and_then(|deps| deps.keys.get(&key))
            .map_or(0, |set| set.len())
    })
}

/// Number of graph entries whose target is still alive.
pub fn target_count() -> usize {
    GRAPH.with(|graph| {
        graph
            .borrow()
            .targets
            .values()
            .filter(|deps| deps.owner.is_alive())
            .count()
    })
}

impl Trackable for Identity {
    fn identity(&self) -> &Identity {
        self
    }
}
