//! Codec trait and the default JSON implementation.
//!
//! The gateway doesn't care how messages become bytes — it just needs
//! something implementing [`Codec`]. JSON is the default because the
//! reference client is a browser; a binary codec can be swapped in
//! without touching any other layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientRequest, GameMode, RoomCode};

    #[test]
    fn test_json_codec_round_trips_client_requests() {
        let codec = JsonCodec;
        let req = ClientRequest::JoinRoom {
            room_code: RoomCode("QX7P".into()),
            player_name: "ada".into(),
        };
        let bytes = codec.encode(&req).unwrap();
        let back: ClientRequest = codec.decode(&bytes).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_an_error() {
        let codec = JsonCodec;
        let result: Result<ClientRequest, _> = codec.decode(b"not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_is_an_error() {
        let codec = JsonCodec;
        let result: Result<GameMode, _> = codec.decode(b"{\"a\": 1}");
        assert!(result.is_err());
    }
}
