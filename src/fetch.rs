//! Keyed fetch cache with at-most-one outstanding request per key.
//!
//! Each key maps to a [`tokio::sync::watch`] receiver that ends up holding
//! the outcome. The first caller for a key spawns a detached task that runs
//! the loader on Tokio's blocking pool and publishes the result; every
//! caller, the first included, only waits on the receiver. Dropping a
//! waiting future therefore never cancels or restarts the load. Inserting
//! the entry and spawning the task happen under one lock, so the "already
//! in flight?" check and "start the fetch" step are atomic per key even
//! when callers run on different worker threads.
//!
//! Successes and failures stay cached per key until [`forget_failure`]
//! or [`clear`]. Entries for other keys are never evicted here.
//!
//! [`forget_failure`]: FetchCache::forget_failure
//! [`clear`]: FetchCache::clear

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};

/// Outcome shared by every caller attached to one fetch.
pub type FetchOutcome<V> = std::result::Result<Arc<V>, Arc<SearchError>>;

/// Observable state of one key.
#[derive(Debug)]
pub enum FetchStatus<V> {
    /// Never requested.
    Idle,
    Loading,
    Success(Arc<V>),
    Error(Arc<SearchError>),
}

impl<V> Clone for FetchStatus<V> {
    fn clone(&self) -> Self {
        match self {
            FetchStatus::Idle => FetchStatus::Idle,
            FetchStatus::Loading => FetchStatus::Loading,
            FetchStatus::Success(v) => FetchStatus::Success(Arc::clone(v)),
            FetchStatus::Error(e) => FetchStatus::Error(Arc::clone(e)),
        }
    }
}

impl<V> From<FetchOutcome<V>> for FetchStatus<V> {
    fn from(outcome: FetchOutcome<V>) -> Self {
        match outcome {
            Ok(v) => FetchStatus::Success(v),
            Err(e) => FetchStatus::Error(e),
        }
    }
}

impl<V> FetchStatus<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn data(&self) -> Option<&Arc<V>> {
        match self {
            FetchStatus::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<SearchError>> {
        match self {
            FetchStatus::Error(e) => Some(e),
            _ => None,
        }
    }
}

type Slot<V> = watch::Receiver<Option<FetchOutcome<V>>>;

pub struct FetchCache<K, V> {
    entries: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for FetchCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> FetchCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch `key`, running `load` only if no fetch for `key` has started.
    ///
    /// `load` is a blocking call; it runs via [`tokio::task::spawn_blocking`]
    /// inside a task that outlives this future. When the key is already
    /// cached or in flight, `load` is dropped unused. Must be polled inside
    /// a Tokio runtime.
    pub async fn fetch<F>(&self, key: &K, load: F) -> FetchOutcome<V>
    where
        F: FnOnce() -> Result<V> + Send + 'static,
        K: Send + 'static,
    {
        let mut slot = {
            let mut entries = self.lock();
            match entries.get(key) {
                Some(slot) => slot.clone(),
                None => {
                    let (tx, rx) = watch::channel(None);
                    entries.insert(key.clone(), rx.clone());
                    tokio::spawn(run_load(key.clone(), load, tx));
                    rx
                }
            }
        };

        let cached = slot.borrow().clone();
        if let Some(done) = cached {
            debug!(?key, "fetch served from cache");
            return done;
        }

        let published = match slot.wait_for(Option::is_some).await {
            Ok(done) => done.clone(),
            Err(_) => None,
        };
        published.unwrap_or_else(|| Err(Arc::new(dropped_load())))
    }

    pub fn status(&self, key: &K) -> FetchStatus<V> {
        let entries = self.lock();
        let Some(slot) = entries.get(key) else {
            return FetchStatus::Idle;
        };
        let status = match slot.borrow().as_ref() {
            None => FetchStatus::Loading,
            Some(Ok(v)) => FetchStatus::Success(Arc::clone(v)),
            Some(Err(e)) => FetchStatus::Error(Arc::clone(e)),
        };
        status
    }

    /// Cached value for `key`, if its fetch succeeded.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        match self.status(key) {
            FetchStatus::Success(v) => Some(v),
            _ => None,
        }
    }

    /// Drop a stored failure for `key` so the next fetch tries again.
    ///
    /// Returns `true` if a failure was removed. Loading and successful
    /// entries are left alone.
    pub fn forget_failure(&self, key: &K) -> bool {
        let mut entries = self.lock();
        let failed = entries
            .get(key)
            .is_some_and(|slot| matches!(slot.borrow().as_ref(), Some(Err(_))));
        if failed {
            entries.remove(key);
            debug!(?key, "stored failure cleared for retry");
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every entry. Fetches still running finish into their own
    /// detached channels and are not stored.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Run `load` on the blocking pool and publish its outcome.
async fn run_load<K, V, F>(key: K, load: F, tx: watch::Sender<Option<FetchOutcome<V>>>)
where
    K: Debug,
    F: FnOnce() -> Result<V> + Send + 'static,
    V: Send + Sync + 'static,
{
    debug!(?key, "fetch started");
    let outcome = match tokio::task::spawn_blocking(load).await {
        Ok(Ok(value)) => {
            debug!(?key, "fetch succeeded");
            Ok(Arc::new(value))
        }
        Ok(Err(e)) => {
            warn!(?key, error = %e, "fetch failed");
            Err(Arc::new(e))
        }
        Err(join) => {
            warn!(?key, error = %join, "fetch task aborted");
            Err(Arc::new(SearchError::InvalidArgument(format!(
                "Task join error: {join}"
            ))))
        }
    };
    // Every receiver may be gone after `clear`; the outcome is then dropped.
    tx.send_replace(Some(outcome));
}

fn dropped_load() -> SearchError {
    SearchError::InvalidArgument("Task join error: fetch task dropped".to_string())
}
