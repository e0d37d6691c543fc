/// Boxed error returned by cache stores and codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the cache layer.
///
/// A cache miss is not an error: [`load_cache`](crate::load_cache) reports it
/// as `Ok(false)`.
#[derive(Debug)]
pub enum CacheError {
    /// No cacher could be resolved, or the cache key is empty.
    Misconfigured(String),
    /// The entity could not be encoded or the payload decoded.
    Codec(BoxError),
    /// The underlying store failed.
    Store {
        operation: &'static str,
        key: String,
        source: BoxError,
    },
}

impl CacheError {
    pub fn codec(err: impl Into<BoxError>) -> Self {
        CacheError::Codec(err.into())
    }

    pub fn is_misconfigured(&self) -> bool {
        matches!(self, CacheError::Misconfigured(_))
    }
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Misconfigured(msg) => write!(f, "Cache misconfigured: {msg}"),
            CacheError::Codec(err) => write!(f, "Cache codec error: {err}"),
            CacheError::Store {
                operation,
                key,
                source,
            } => write!(f, "Cache {operation} of '{key}' failed: {source}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Codec(err) => Some(err.as_ref()),
            CacheError::Store { source, .. } => Some(source.as_ref()),
            CacheError::Misconfigured(_) => None,
        }
    }
}
