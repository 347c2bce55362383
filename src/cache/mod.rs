//! # Loading Cache
//!
//! A bounded, optionally expiring map whose values are computed on demand,
//! at most once per key at a time.
//!
//! Both caches in the engine are instances of this type:
//! - the path cache (LRU bound, no expiry) keyed by job identifier;
//! - the obstruction cache (LRU bound, expire-after-write) keyed by a
//!   doubled-resolution voxel index.
//!
//! ## Single-flight
//!
//! A miss registers an in-flight load, a shared [`oneshot`] receiver, before
//! the loader runs. Anyone else asking for the key while it is loading awaits
//! that receiver and gets the loader's result, success or failure. The loader
//! runs on the caller's thread with the cache lock released, so loads for
//! different keys proceed in parallel.
//!
//! In-flight loads live beside the LRU, not in it. Eviction and invalidation
//! only ever drop finished values, so a key stays single-flight for as long as
//! its load runs no matter how much else is inserted meanwhile. An
//! invalidation that lands during a load keeps that load's value out of the
//! cache; its waiters still receive it.
//!
//! A loader that panics is caught; the panic becomes a
//! [`PathfinderError::ComputationFault`] for the loader's caller and for every
//! waiter, and nothing is cached for the key.
//!
//! ## Eviction
//!
//! Finished values live in an [`lru::LruCache`], so the resident count never
//! exceeds the capacity; the least recently used entry goes first. With a TTL,
//! an entry older than the TTL is treated as a miss on its next lookup and is
//! recomputed, regardless of how often it was read in between.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{FutureExt, Shared};
use lru::LruCache;
use web_time::{Duration, Instant};

use crate::error::{PathfinderError, Result};

type Flight<V> = Shared<oneshot::Receiver<Result<V>>>;

struct Ready<V> {
    value: V,
    written: Instant,
}

struct Entries<K: Hash + Eq, V> {
    ready: LruCache<K, Ready<V>>,
    loading: HashMap<K, Flight<V>>,
    /// Bumped by every invalidation.
    generation: u64,
}

enum Lookup<V> {
    Hit(V),
    Wait(Flight<V>),
    Load(oneshot::Sender<Result<V>>, u64),
}

/// Bounded single-flight cache.
pub struct LoadingCache<K: Hash + Eq, V> {
    entries: Mutex<Entries<K, V>>,
    ttl: Option<Duration>,
}

impl<K, V> LoadingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                ready: LruCache::new(capacity),
                loading: HashMap::new(),
                generation: 0,
            }),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, written: Instant) -> bool {
        match self.ttl {
            Some(ttl) => written.elapsed() < ttl,
            None => true,
        }
    }

    /// Returns the cached value for `key`, computing it with `load` on a miss.
    ///
    /// Blocks while another thread is loading the same key.
    pub fn get_or_load<F>(&self, key: &K, load: F) -> Result<V>
    where
        F: FnOnce(&K) -> Result<V>,
    {
        let lookup = {
            let mut guard = self.lock();
            let entries = &mut *guard;
            match entries.ready.get(key) {
                Some(ready) if self.is_fresh(ready.written) => Lookup::Hit(ready.value.clone()),
                _ => match entries.loading.get(key) {
                    Some(flight) => Lookup::Wait(flight.clone()),
                    None => {
                        let (sender, receiver) = oneshot::channel();
                        entries.loading.insert(key.clone(), receiver.shared());
                        Lookup::Load(sender, entries.generation)
                    }
                },
            }
        };

        match lookup {
            Lookup::Hit(value) => Ok(value),
            Lookup::Wait(flight) => block_on(flight).unwrap_or_else(|_| {
                Err(PathfinderError::ComputationFault(
                    "load abandoned before completing".to_string(),
                ))
            }),
            Lookup::Load(sender, generation) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| load(key)))
                    .unwrap_or_else(|payload| {
                        Err(PathfinderError::ComputationFault(panic_message(&*payload)))
                    });
                self.complete(key, generation, &result);
                // Nobody waiting is fine.
                let _ = sender.send(result.clone());
                result
            }
        }
    }

    /// Retires the in-flight load of `key` and caches a success, unless the
    /// cache was invalidated since the load began.
    fn complete(&self, key: &K, generation: u64, result: &Result<V>) {
        let mut entries = self.lock();
        entries.loading.remove(key);
        match result {
            Ok(value) if entries.generation == generation => {
                entries.ready.put(
                    key.clone(),
                    Ready {
                        value: value.clone(),
                        written: Instant::now(),
                    },
                );
            }
            Ok(_) => {}
            Err(_) => {
                entries.ready.pop(key);
            }
        }
    }

/// The cached value for `key` if it is loaded and fresh. Never loads.
    pub fn get_if_present(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.ready.get(key) {
            Some(ready) if self.is_fresh(ready.written) => Some(ready.value.clone()),
            _ => None,
        }
    }

    /// Drops the value for `key`. A load in flight still completes for its
    /// waiters but is not cached.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.lock();
        entries.ready.pop(key);
        entries.generation += 1;
    }

    /// Drops every value. Loads in flight behave as for [`invalidate`](Self::invalidate).
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        entries.ready.clear();
        entries.generation += 1;
    }

    /// Whether a load of `key` is running.
    pub fn is_loading(&self, key: &K) -> bool {
        self.lock().loading.contains_key(key)
    }

    /// Number of cached values, counting expired ones not yet looked up again.
    /// Loads in flight are not counted.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured bound.
    pub fn capacity(&self) -> usize {
        self.lock().ready.cap().get()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
