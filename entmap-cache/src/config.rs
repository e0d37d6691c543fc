use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::codec::CodecKind;
use crate::defaults;

/// Environment variable overriding `cache.expiration` (seconds).
pub const ENV_EXPIRATION: &str = "ENTMAP_CACHE_EXPIRATION";
/// Environment variable overriding `cache.codec` (`json` / `msgpack`).
pub const ENV_CODEC: &str = "ENTMAP_CACHE_CODEC";

/// Error type for cache configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading the file.
    Load(String),
    /// A value was present but could not be interpreted.
    Invalid { key: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Invalid { key, message } => {
                write!(f, "Invalid config value for '{key}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_expiration_secs() -> u64 {
    defaults::DEFAULT_EXPIRATION.as_secs()
}

/// The `cache` section of an application config file.
///
/// ```yaml
/// cache:
///   expiration: 120   # seconds, 0 = built-in default
///   codec: msgpack    # json | msgpack
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_expiration_secs")]
    pub expiration: u64,
    #[serde(default)]
    pub codec: CodecKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration: default_expiration_secs(),
            codec: CodecKind::default(),
        }
    }
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    cache: CacheConfig,
}

impl CacheConfig {
    /// Parse the `cache` section of a YAML document. A missing section yields defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: Document =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
        Ok(doc.cache)
    }

    /// Load a YAML file. A missing file yields defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Defaults overridden by `ENTMAP_CACHE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_EXPIRATION) {
            self.expiration = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_EXPIRATION,
                message: format!("'{raw}' is not a number of seconds"),
            })?;
        }
        if let Some(raw) = lookup(ENV_CODEC) {
            self.codec = raw.parse().map_err(|message| ConfigError::Invalid {
                key: ENV_CODEC,
                message,
            })?;
        }
        Ok(self)
    }

    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration)
    }

    /// Apply as the process-wide codec and expiration defaults.
    pub fn install(&self) {
        defaults::set_default_expiration(self.expiration());
        defaults::set_default_codec(self.codec);
        tracing::debug!(
            expiration_secs = defaults::default_expiration().as_secs(),
            codec = ?self.codec,
            "cache defaults installed"
        );
    }
}
