//! # entmap-cache — explicit read/write-through entity cache
//!
//! Entities implementing [`Cacheable`] describe where they live in a cache
//! via a [`CacheOption`]; [`save_cache`], [`load_cache`] and [`delete_cache`]
//! move their encoded form in and out of a [`CacheStore`]. Nothing here is
//! invoked implicitly by the CRUD layer.
//!
//! ```ignore
//! impl Cacheable for Account {
//!     fn cache_option(&self) -> CacheOption<Self> {
//!         CacheOption::new(format!("account:{}", self.id))
//!     }
//! }
//!
//! entmap_cache::set_default_cacher(InMemoryStore::new());
//! save_cache(&account).await?;
//!
//! let mut fresh = Account { id: account.id, ..Default::default() };
//! if !load_cache(&mut fresh).await? {
//!     // miss: fall through to the database
//! }
//! ```

pub mod codec;
pub mod config;
pub mod defaults;
pub mod error;
pub mod ops;
pub mod option;
pub mod store;

pub use codec::{CodecKind, Decoder, Encoder, JsonCodec, MessagePackCodec};
pub use config::{CacheConfig, ConfigError};
pub use defaults::{
    clear_default_cacher, default_cacher, default_codec, default_expiration, set_default_cacher,
    set_default_codec, set_default_expiration, set_shared_default_cacher, DEFAULT_EXPIRATION,
};
pub use error::{BoxError, CacheError};
pub use ops::{delete_cache, load_cache, save_cache};
pub use option::{CacheOption, Cacheable};
pub use store::{CacheStore, InMemoryStore, StoreFuture};

pub mod prelude {
    //! Re-exports of the most commonly used cache types.
    pub use crate::{
        delete_cache, load_cache, save_cache, CacheOption, CacheStore, Cacheable, InMemoryStore,
    };
}
