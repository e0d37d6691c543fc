use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Turns an entity into a cacheable payload.
pub trait Encoder<E>: Send + Sync {
    fn encode(&self, entity: &E) -> Result<Bytes, CacheError>;
}

/// Restores a cached payload into an entity, in place.
pub trait Decoder<E>: Send + Sync {
    fn decode(&self, data: &[u8], entity: &mut E) -> Result<(), CacheError>;
}

/// JSON codec via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<E: Serialize> Encoder<E> for JsonCodec {
    fn encode(&self, entity: &E) -> Result<Bytes, CacheError> {
        serde_json::to_vec(entity)
            .map(Bytes::from)
            .map_err(CacheError::codec)
    }
}

impl<E: DeserializeOwned> Decoder<E> for JsonCodec {
    fn decode(&self, data: &[u8], entity: &mut E) -> Result<(), CacheError> {
        *entity = serde_json::from_slice(data).map_err(CacheError::codec)?;
        Ok(())
    }
}

/// Compact binary codec via `rmp-serde` (MessagePack, struct-as-map).
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl<E: Serialize> Encoder<E> for MessagePackCodec {
    fn encode(&self, entity: &E) -> Result<Bytes, CacheError> {
        rmp_serde::to_vec_named(entity)
            .map(Bytes::from)
            .map_err(CacheError::codec)
    }
}

impl<E: DeserializeOwned> Decoder<E> for MessagePackCodec {
    fn decode(&self, data: &[u8], entity: &mut E) -> Result<(), CacheError> {
        *entity = rmp_serde::from_slice(data).map_err(CacheError::codec)?;
        Ok(())
    }
}

/// Codec used when an entity's cache option names none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Json,
    #[serde(alias = "messagepack")]
    Msgpack,
}

impl CodecKind {
    pub fn encode<E: Serialize>(self, entity: &E) -> Result<Bytes, CacheError> {
        match self {
            CodecKind::Json => JsonCodec.encode(entity),
            CodecKind::Msgpack => MessagePackCodec.encode(entity),
        }
    }

    pub fn decode<E: DeserializeOwned>(self, data: &[u8], entity: &mut E) -> Result<(), CacheError> {
        match self {
            CodecKind::Json => JsonCodec.decode(data, entity),
            CodecKind::Msgpack => MessagePackCodec.decode(data, entity),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(CodecKind::Json),
            "msgpack" | "messagepack" => Ok(CodecKind::Msgpack),
            other => Err(format!("unknown cache codec '{other}'")),
        }
    }
}
