use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;

use crate::error::BoxError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + Send + 'a>>;

/// Pluggable cache backend.
///
/// Implement this to put entity payloads in Redis, Memcached, etc. No
/// transactional semantics are assumed. `get` returns `Ok(None)` for absent
/// or expired keys.
pub trait CacheStore: Send + Sync + 'static {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Bytes>>;
    fn put<'a>(&'a self, key: &'a str, value: Bytes, ttl: Duration) -> StoreFuture<'a, ()>;
    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// In-memory cache store backed by `DashMap`.
///
/// Each entry stores `(value, inserted_at, ttl)` and is lazily evicted on access.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<DashMap<String, (Bytes, Instant, Duration)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove all expired entries.
    pub fn evict_expired(&self) {
        self.inner
            .retain(|_, (_, inserted, ttl)| inserted.elapsed() < *ttl);
    }

    fn get_sync(&self, key: &str) -> Option<Bytes> {
        if let Some(entry) = self.inner.get(key) {
            let (val, inserted, ttl) = entry.value();
            if inserted.elapsed() < *ttl {
                return Some(val.clone());
            }
            // Expired: drop the read guard before removing
            drop(entry);
            self.inner.remove(key);
        }
        None
    }
}

impl CacheStore for InMemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Bytes>> {
        Box::pin(async move { Ok(self.get_sync(key)) })
    }

    fn put<'a>(&'a self, key: &'a str, value: Bytes, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.inner
                .insert(key.to_string(), (value, Instant::now(), ttl));
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.inner.remove(key);
            Ok(())
        })
    }
}
