//! Per-connection handler.
//!
//! Each accepted socket gets its own task running [`handle_connection`]
//! plus a writer task draining the connection's outbound queue. Reads
//! and writes never share an await point: dispatch pushes encoded
//! frames into the queue and the writer flushes them in order.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use quizroom_protocol::{ClientCommand, Codec, ErrorCode};
use quizroom_session::ConnectionId;

use crate::dispatch::{dispatch, handle_disconnect, send_error};
use crate::state::AppState;
use crate::QuizroomError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    state: Arc<AppState>,
) -> Result<(), QuizroomError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let connection_id = ConnectionId::next();
    tracing::debug!(%connection_id, "connection accepted");

    let (mut sink, mut source) = ws.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    // Writer task: drains the queue until every sender is gone, which
    // happens once this handler returns and the last binding is dropped.
    // Events go out as text frames; the JSON codec only produces valid
    // UTF-8, so the conversion cannot fail in practice.
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let Ok(text) = String::from_utf8(frame) else {
                continue;
            };
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(message) = source.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "read error");
                break;
            }
        };
        let data = match message {
            Message::Binary(data) => data.to_vec(),
            Message::Text(text) => text.as_bytes().to_vec(),
            Message::Close(_) => break,
            // Ping/pong are answered by tungstenite itself.
            _ => continue,
        };

        match state.codec.decode::<ClientCommand>(&data) {
            Ok(command) => {
                if let Err(e) =
                    dispatch(&state, connection_id, &outbound, command).await
                {
                    tracing::warn!(%connection_id, error = %e, "dispatch failed");
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "malformed frame");
                send_error(
                    &state,
                    &outbound,
                    ErrorCode::BadRequest,
                    "malformed command",
                )?;
            }
        }
    }

    tracing::debug!(%connection_id, "connection closed");
    handle_disconnect(&state, connection_id).await
}
