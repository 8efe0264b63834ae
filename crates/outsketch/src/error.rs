//! Gateway error type.

use outsketch_protocol::ProtocolError;

/// Errors at the connection/server boundary.
///
/// Game-rule refusals are *not* errors — they travel back to the client
/// as `error` events and never surface here. This type covers the
/// plumbing: sockets, frames, and malformed payloads.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Binding or accepting a TCP connection failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The WebSocket layer failed (handshake, frame, close).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A message could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
