//! Unified error type for the server crate.

use quizroom_protocol::ProtocolError;

/// Top-level error that wraps the failures a running server can hit.
///
/// Room-level rejections never appear here: those are reported to the
/// offending client as `ERROR` events and the connection carries on.
/// This type is for the failures that end a connection or stop the
/// server.
#[derive(Debug, thiserror::Error)]
pub enum QuizroomError {
    /// Listener setup or socket-level I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The WebSocket layer failed (handshake, frame transport).
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Encoding an outbound event failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
