use std::sync::Arc;
use std::time::Duration;

use crate::codec::{Decoder, Encoder};
use crate::store::CacheStore;

/// How and where one entity instance is cached.
///
/// Unset fields fall back to the process-wide defaults (see [`crate::defaults`]).
/// A zero expiration also means "use the default".
pub struct CacheOption<E> {
    pub cacher: Option<Arc<dyn CacheStore>>,
    pub key: String,
    pub expiration: Duration,
    pub encoder: Option<Arc<dyn Encoder<E>>>,
    pub decoder: Option<Arc<dyn Decoder<E>>>,
}

impl<E> CacheOption<E> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            cacher: None,
            key: key.into(),
            expiration: Duration::ZERO,
            encoder: None,
            decoder: None,
        }
    }

    pub fn cacher(mut self, store: impl CacheStore) -> Self {
        self.cacher = Some(Arc::new(store));
        self
    }

    pub fn shared_cacher(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cacher = Some(store);
        self
    }

    pub fn expiration(mut self, ttl: Duration) -> Self {
        self.expiration = ttl;
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder<E> + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    pub fn decoder(mut self, decoder: impl Decoder<E> + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Use one value as both encoder and decoder.
    pub fn codec<C>(self, codec: C) -> Self
    where
        C: Encoder<E> + Decoder<E> + Clone + 'static,
    {
        self.encoder(codec.clone()).decoder(codec)
    }
}

impl<E> Clone for CacheOption<E> {
    fn clone(&self) -> Self {
        Self {
            cacher: self.cacher.clone(),
            key: self.key.clone(),
            expiration: self.expiration,
            encoder: self.encoder.clone(),
            decoder: self.decoder.clone(),
        }
    }
}

impl<E> std::fmt::Debug for CacheOption<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOption")
            .field("cacher", &self.cacher.is_some())
            .field("key", &self.key)
            .field("expiration", &self.expiration)
            .field("encoder", &self.encoder.is_some())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// An entity that can be mirrored in a cache store.
///
/// The option is recomputed on every cache call, so the key can be derived
/// from the entity's current fields.
pub trait Cacheable: Sized + Send + Sync {
    fn cache_option(&self) -> CacheOption<Self>;
}
