//! Process-wide cache defaults.
//!
//! There is no implicit default store: until
//! [`set_default_cacher`] is called, entities that do not name their own
//! cacher fail with [`CacheError::Misconfigured`](crate::CacheError).

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::codec::CodecKind;
use crate::store::CacheStore;

/// Expiration used when neither the entity nor [`set_default_expiration`] gives one.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(5 * 60);

static DEFAULT_CACHER: RwLock<Option<Arc<dyn CacheStore>>> = RwLock::new(None);
static DEFAULT_CODEC: RwLock<CodecKind> = RwLock::new(CodecKind::Json);
static DEFAULT_TTL: RwLock<Duration> = RwLock::new(DEFAULT_EXPIRATION);

/// Set the store used by entities whose cache option names none.
pub fn set_default_cacher(store: impl CacheStore) {
    set_shared_default_cacher(Arc::new(store));
}

pub fn set_shared_default_cacher(store: Arc<dyn CacheStore>) {
    *DEFAULT_CACHER.write().unwrap_or_else(PoisonError::into_inner) = Some(store);
}

pub fn clear_default_cacher() {
    *DEFAULT_CACHER.write().unwrap_or_else(PoisonError::into_inner) = None;
}

pub fn default_cacher() -> Option<Arc<dyn CacheStore>> {
    DEFAULT_CACHER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn set_default_codec(codec: CodecKind) {
    *DEFAULT_CODEC.write().unwrap_or_else(PoisonError::into_inner) = codec;
}

pub fn default_codec() -> CodecKind {
    *DEFAULT_CODEC.read().unwrap_or_else(PoisonError::into_inner)
}

/// Set the default expiration. A zero duration restores [`DEFAULT_EXPIRATION`].
pub fn set_default_expiration(ttl: Duration) {
    let ttl = if ttl.is_zero() { DEFAULT_EXPIRATION } else { ttl };
    *DEFAULT_TTL.write().unwrap_or_else(PoisonError::into_inner) = ttl;
}

pub fn default_expiration() -> Duration {
    *DEFAULT_TTL.read().unwrap_or_else(PoisonError::into_inner)
}
