use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use entmap_cache::{CacheStore, InMemoryStore, StoreFuture};

/// One operation seen by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get(String),
    Put { key: String, ttl: Duration },
    Delete(String),
}

#[derive(Default)]
struct Shared {
    ops: Mutex<Vec<StoreOp>>,
    failing: AtomicBool,
}

/// [`InMemoryStore`] wrapper that records every operation.
///
/// Clones share the same log and backing map, so a clone can be installed as
/// the default cacher while the test keeps a handle for assertions.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    shared: Arc<Shared>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a store error.
    pub fn fail(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.shared
            .ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// TTL passed to the most recent `put` for `key`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.ops().into_iter().rev().find_map(|op| match op {
            StoreOp::Put { key: k, ttl } if k == key => Some(ttl),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn record(&self, op: StoreOp) -> Result<(), entmap_cache::BoxError> {
        self.shared
            .ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err("store unavailable".into());
        }
        Ok(())
    }
}

impl CacheStore for RecordingStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Bytes>> {
        Box::pin(async move {
            self.record(StoreOp::Get(key.to_string()))?;
            self.inner.get(key).await
        })
    }

    fn put<'a>(&'a self, key: &'a str, value: Bytes, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.record(StoreOp::Put {
                key: key.to_string(),
                ttl,
            })?;
            self.inner.put(key, value, ttl).await
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.record(StoreOp::Delete(key.to_string()))?;
            self.inner.delete(key).await
        })
    }
}
