//! Codec seam between typed messages and raw socket frames.
//!
//! The server speaks JSON today ([`JsonCodec`]), but everything above
//! the socket goes through the [`Codec`] trait, so a binary codec could
//! be swapped in without touching the handlers.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes and decodes protocol messages.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Human-readable, which keeps wire
/// traffic inspectable in browser devtools.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
