//! In-memory key/value cache with fetch coalescing.
//!
//! Entries never expire and the map is unbounded; it lives for the lifetime of
//! the process. Concurrent misses on the same key share one fetch: the first
//! caller becomes the leader and runs the fetch, later callers wait on a
//! `watch` channel for its outcome. A leader that is dropped mid-fetch writes
//! nothing, and its waiters retry with one of them taking over.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

type Outcome<V, E> = Option<Result<V, E>>;

struct State<V, E> {
    entries: HashMap<String, V>,
    in_flight: HashMap<String, watch::Receiver<Outcome<V, E>>>,
}

/// Hit/miss counters, mostly useful for logging.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of fetches actually started
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of callers that joined another caller's in-flight fetch
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }
}

enum Role<V, E> {
    Leader(watch::Sender<Outcome<V, E>>),
    Follower(watch::Receiver<Outcome<V, E>>),
}

pub struct FetchCache<V, E> {
    state: Mutex<State<V, E>>,
    stats: CacheStats,
}

impl<V, E> Default for FetchCache<V, E> {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
            }),
            stats: CacheStats::default(),
        }
    }
}

impl<V: Clone, E: Clone> FetchCache<V, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, without fetching.
    pub fn get(&self, key: &str) -> Option<V> {
        self.state.lock().entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Number of fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Return the cached value for `key`, or run `fetch` to produce it.
    ///
    /// Only `Ok` outcomes are stored. Every caller that joined the same
    /// in-flight fetch receives a clone of its outcome, error included.
    ///
    /// # Errors
    /// Whatever `fetch` returns.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loop {
            let role = {
                let mut state = self.state.lock();
                if let Some(value) = state.entries.get(key) {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "cache hit");
                    return Ok(value.clone());
                }
                match state.in_flight.get(key) {
                    Some(rx) => Role::Follower(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        state.in_flight.insert(key.to_string(), rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "cache miss, fetching");

                    let guard = InFlightGuard {
                        state: &self.state,
                        key,
                        armed: true,
                    };
                    let result = fetch().await;
                    guard.complete(&result);

                    tx.send_replace(Some(result.clone()));
                    return result;
                }
                Role::Follower(mut rx) => {
                    self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "joining in-flight fetch");

                    if let Ok(outcome) = rx.wait_for(Option::is_some).await {
                        let shared: Outcome<V, E> = (*outcome).clone();
                        if let Some(result) = shared {
                            return result;
                        }
                    }
                    tracing::debug!(key, "in-flight fetch abandoned, retrying");
                }
            }
        }
    }
}

/// Deregisters the leader's in-flight entry if its future is dropped before
/// the fetch completes.
struct InFlightGuard<'a, V, E> {
    state: &'a Mutex<State<V, E>>,
    key: &'a str,
    armed: bool,
}

impl<V, E> InFlightGuard<'_, V, E> {
    /// Store a successful value and clear the in-flight entry in one step, so
    /// no caller can observe neither.
    fn complete(mut self, result: &Result<V, E>)
    where
        V: Clone,
    {
        let mut state = self.state.lock();
        if let Ok(value) = result {
            state.entries.insert(self.key.to_string(), value.clone());
        }
        state.in_flight.remove(self.key);
        self.armed = false;
    }
}

impl<V, E> Drop for InFlightGuard<'_, V, E> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().in_flight.remove(self.key);
        }
    }
}
