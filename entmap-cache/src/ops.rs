use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::defaults;
use crate::error::CacheError;
use crate::option::{CacheOption, Cacheable};
use crate::store::CacheStore;

/// A cache option with every default applied.
struct Resolved<E> {
    cacher: Arc<dyn CacheStore>,
    key: String,
    expiration: Duration,
    option: CacheOption<E>,
}

fn resolve<E: Cacheable>(ent: &E) -> Result<Resolved<E>, CacheError> {
    let mut option = ent.cache_option();
    let cacher = match option.cacher.take().or_else(defaults::default_cacher) {
        Some(cacher) => cacher,
        None => {
            return Err(CacheError::Misconfigured(format!(
                "no cacher for {} and no default cacher set",
                std::any::type_name::<E>()
            )))
        }
    };
    if option.key.is_empty() {
        return Err(CacheError::Misconfigured(format!(
            "empty cache key for {}",
            std::any::type_name::<E>()
        )));
    }
    let expiration = if option.expiration.is_zero() {
        defaults::default_expiration()
    } else {
        option.expiration
    };
    Ok(Resolved {
        cacher,
        key: std::mem::take(&mut option.key),
        expiration,
        option,
    })
}

/// Encode `ent` and write it to its cacher under its key.
pub async fn save_cache<E>(ent: &E) -> Result<(), CacheError>
where
    E: Cacheable + Serialize,
{
    let resolved = resolve(ent)?;
    let data = match &resolved.option.encoder {
        Some(encoder) => encoder.encode(ent)?,
        None => defaults::default_codec().encode(ent)?,
    };
    resolved
        .cacher
        .put(&resolved.key, data, resolved.expiration)
        .await
        .map_err(|source| CacheError::Store {
            operation: "save",
            key: resolved.key.clone(),
            source,
        })?;
    tracing::debug!(key = %resolved.key, ttl_secs = resolved.expiration.as_secs(), "entity cached");
    Ok(())
}

/// Fill `ent` from the cache.
///
/// Returns `Ok(false)` on a miss (absent or empty payload) so callers can fall
/// through to the primary store; `ent` is left untouched in that case.
pub async fn load_cache<E>(ent: &mut E) -> Result<bool, CacheError>
where
    E: Cacheable + DeserializeOwned,
{
    let resolved = resolve(ent)?;
    let data = resolved
        .cacher
        .get(&resolved.key)
        .await
        .map_err(|source| CacheError::Store {
            operation: "load",
            key: resolved.key.clone(),
            source,
        })?;

    let data = match data {
        Some(data) if !data.is_empty() => data,
        _ => {
            tracing::debug!(key = %resolved.key, "cache miss");
            return Ok(false);
        }
    };

    match &resolved.option.decoder {
        Some(decoder) => decoder.decode(&data, ent)?,
        None => defaults::default_codec().decode(&data, ent)?,
    }
    tracing::debug!(key = %resolved.key, "cache hit");
    Ok(true)
}

/// Remove `ent`'s cached payload.
pub async fn delete_cache<E: Cacheable>(ent: &E) -> Result<(), CacheError> {
    let resolved = resolve(ent)?;
    resolved
        .cacher
        .delete(&resolved.key)
        .await
        .map_err(|source| CacheError::Store {
            operation: "delete",
            key: resolved.key.clone(),
            source,
        })
}
