//! Claim-slot-then-execute fetch cache

use crate::error::{Error, Result};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type SharedResult<T> = std::result::Result<Arc<T>, Arc<Error>>;
type SharedFetch<T> = Shared<BoxFuture<'static, SharedResult<T>>>;

/// One claimed key: the shared fetch plus an id that tells this claim apart
/// from a later one for the same key.
struct Slot<T> {
    id: u64,
    fetch: SharedFetch<T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            fetch: self.fetch.clone(),
        }
    }
}

/// Key-addressed cache of in-flight and completed metadata fetches
pub struct MetadataCache<T> {
    entries: Arc<DashMap<String, Slot<T>>>,
    next_id: AtomicU64,
}

impl<T: Send + Sync + 'static> MetadataCache<T> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Return the value for `key`, running `fetch` only if no fetch for the
    /// key is cached or in flight
    ///
    /// `fetch` is invoked at most once, and only by the caller that claimed
    /// the slot. Every concurrent caller for the key receives the same
    /// `Arc<T>`, or the same error wrapped in [`Error::Shared`].
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (pending, claimed) = {
            let mut claimed = false;
            let slot = self
                .entries
                .entry(key.to_string())
                .or_insert_with(|| {
                    claimed = true;
                    self.claim(key, fetch)
                });
            (slot.fetch.clone(), claimed)
        };

        if claimed {
            debug!(key, "metadata cache miss");
        } else {
            debug!(key, "metadata cache hit");
        }

        pending.await.map_err(Error::Shared)
    }

    /// Build the slot for a newly claimed key
    ///
    /// Nothing runs until the first waiter polls the shared future; from
    /// then on the fetch lives in its own task.
    fn claim<F, Fut>(&self, key: &str, fetch: F) -> Slot<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let key = key.to_string();

        let run = async move {
            let task_entries = Arc::clone(&entries);
            let task_key = key.clone();
            let handle = tokio::spawn(async move {
                let result = fetch().await;
                if let Err(ref e) = result {
                    debug!(key = %task_key, error = %e, "metadata fetch failed, evicting");
                    task_entries.remove_if(&task_key, |_, slot| slot.id == id);
                }
                result.map(Arc::new).map_err(Arc::new)
            });

            match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    entries.remove_if(&key, |_, slot| slot.id == id);
                    Err(Arc::new(Error::Other(format!(
                        "metadata fetch for '{key}' did not complete: {join_error}"
                    ))))
                }
            }
        };

        Slot {
            id,
            fetch: run.boxed().shared(),
        }
    }

    /// Completed value for `key`, without waiting or fetching
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let slot = self.entries.get(key)?;
        match slot.fetch.peek() {
            Some(Ok(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Whether a fetch for `key` is cached or in flight
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop the entry for one key
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry
    ///
    /// In-flight fetches keep running for the callers already waiting on
    /// them; their results are not stored.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached or in-flight keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Send + Sync + 'static> Default for MetadataCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MetadataCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
