//! Command dispatch: wire commands in, room mutations, snapshots out.
//!
//! Every handler follows the same shape: resolve the room, apply the
//! mutation under the room's lock, and while still holding the lock
//! broadcast a per-recipient snapshot to every bound connection.
//! Broadcasting under the lock is what keeps each connection's stream
//! of snapshots monotone: two mutations can't interleave their sends.
//!
//! Rejections go only to the sender as `ERROR` events; nothing else is
//! notified and nothing is mutated.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use quizroom_protocol::{ClientCommand, Codec, ErrorCode, PlayerId, RoomId};
use quizroom_room::{QuestionPatch, Room, RoomError, ServerEvent};
use quizroom_session::{Binding, ConnectionId};

use crate::state::AppState;
use crate::QuizroomError;

/// Routes one decoded command from a connection.
pub(crate) async fn dispatch(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    outbound: &UnboundedSender<Vec<u8>>,
    command: ClientCommand,
) -> Result<(), QuizroomError> {
    match command {
        ClientCommand::CreateRoom {
            player_id,
            host_name,
            room_name,
            settings,
        } => {
            if player_id.is_empty() || host_name.is_empty() {
                return send_error(
                    state,
                    outbound,
                    ErrorCode::BadRequest,
                    "playerId and hostName are required",
                );
            }
            let (room_id, shared) = state
                .rooms
                .create_room(room_name, player_id.clone(), host_name, settings)
                .await;
            let room = shared.lock().await;
            state
                .binder
                .bind(
                    connection_id,
                    Binding {
                        room_id: room_id.clone(),
                        player_id: player_id.clone(),
                        sender: outbound.clone(),
                    },
                )
                .await;
            send_event(
                state,
                outbound,
                &ServerEvent::RoomCreated {
                    room_id,
                    room_state: room.snapshot_for(Some(&player_id)),
                },
            )
        }

        ClientCommand::JoinRoom {
            room_id,
            player_id,
            name,
        } => {
            handle_join(
                state,
                connection_id,
                outbound,
                room_id,
                player_id,
                Some(name),
            )
            .await
        }

        ClientCommand::RejoinRoom {
            room_id,
            player_id,
            name,
        } => {
            handle_join(state, connection_id, outbound, room_id, player_id, name)
                .await
        }

        ClientCommand::SetReady {
            room_id,
            player_id,
            is_ready,
        } => {
            apply(state, outbound, &room_id, |room| {
                room.set_ready(&player_id, is_ready)
            })
            .await
        }

        ClientCommand::StartGame { room_id, player_id } => {
            apply(state, outbound, &room_id, |room| room.start_game(&player_id))
                .await
        }

        ClientCommand::SetPrompt {
            room_id,
            player_id,
            prompt,
            image_url,
            correct_answer,
        } => {
            apply(state, outbound, &room_id, |room| {
                room.set_current_question_content(
                    &player_id,
                    QuestionPatch {
                        prompt,
                        image_url,
                        correct_answer,
                    },
                )
            })
            .await
        }

        ClientCommand::SetQuestionContent {
            room_id,
            player_id,
            round_index,
            question_index,
            prompt,
            image_url,
            correct_answer,
        } => {
            apply(state, outbound, &room_id, |room| {
                room.set_question_content(
                    &player_id,
                    round_index,
                    question_index,
                    QuestionPatch {
                        prompt,
                        image_url,
                        correct_answer,
                    },
                )
            })
            .await
        }

        ClientCommand::SubmitAnswer {
            room_id,
            player_id,
            answer,
        } => {
            // Ignored submissions still rebroadcast: the sender's UI
            // resyncs to the state that rejected it.
            apply(state, outbound, &room_id, |room| {
                room.submit_answer(&player_id, answer).map(|_| ())
            })
            .await
        }

        ClientCommand::LockSubmissions { room_id, player_id } => {
            apply(state, outbound, &room_id, |room| {
                room.lock_submissions(&player_id)
            })
            .await
        }

        ClientCommand::MarkCorrect {
            room_id,
            player_id,
            submission_id,
            is_correct,
        } => {
            apply(state, outbound, &room_id, |room| {
                room.mark_correct(&player_id, &submission_id, is_correct)
            })
            .await
        }

        ClientCommand::PickWinner {
            room_id,
            player_id,
            submission_id,
        } => {
            apply(state, outbound, &room_id, |room| {
                room.pick_winner(&player_id, &submission_id)
            })
            .await
        }

        ClientCommand::ConfirmResults { room_id, player_id } => {
            apply(state, outbound, &room_id, |room| {
                room.confirm_results(&player_id).map(|_| ())
            })
            .await
        }

        ClientCommand::NextQuestion { room_id, player_id } => {
            apply(state, outbound, &room_id, |room| {
                room.next_question(&player_id)
            })
            .await
        }

        ClientCommand::EndGame { room_id, player_id } => {
            apply(state, outbound, &room_id, |room| room.end_game(&player_id))
                .await
        }

        ClientCommand::CloseRoom { room_id, player_id } => {
            handle_close(state, outbound, room_id, player_id).await
        }
    }
}

/// JOIN_ROOM and REJOIN_ROOM share everything but the name's
/// optionality.
async fn handle_join(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    outbound: &UnboundedSender<Vec<u8>>,
    room_id: RoomId,
    player_id: PlayerId,
    name: Option<String>,
) -> Result<(), QuizroomError> {
    if player_id.is_empty() {
        return send_error(
            state,
            outbound,
            ErrorCode::BadRequest,
            "playerId is required",
        );
    }
    let shared = match state.rooms.get(&room_id).await {
        Ok(shared) => shared,
        Err(e) => return send_room_error(state, outbound, &e),
    };

    let mut room = shared.lock().await;
    room.join(player_id.clone(), name);
    state
        .binder
        .bind(
            connection_id,
            Binding {
                room_id: room_id.clone(),
                player_id: player_id.clone(),
                sender: outbound.clone(),
            },
        )
        .await;

    // The host coming back cancels any pending grace timer.
    if room.host_id == player_id {
        state.continuity.disarm(&room_id).await;
    }

    send_event(
        state,
        outbound,
        &ServerEvent::Joined {
            room_id,
            player_id: player_id.clone(),
            room_state: room.snapshot_for(Some(&player_id)),
        },
    )?;
    broadcast_room(state, &room).await
}

/// CLOSE_ROOM: host-gated teardown. The room leaves the store, its
/// timer dies, every member gets `ROOM_CLOSED` and loses its binding.
async fn handle_close(
    state: &Arc<AppState>,
    outbound: &UnboundedSender<Vec<u8>>,
    room_id: RoomId,
    player_id: PlayerId,
) -> Result<(), QuizroomError> {
    let shared = match state.rooms.get(&room_id).await {
        Ok(shared) => shared,
        Err(e) => return send_room_error(state, outbound, &e),
    };
    {
        let room = shared.lock().await;
        if room.host_id != player_id {
            return send_room_error(
                state,
                outbound,
                &RoomError::NotHost(player_id),
            );
        }
    }

    state.continuity.disarm(&room_id).await;
    state.rooms.remove(&room_id).await;
    let closed = ServerEvent::RoomClosed {
        room_id: room_id.clone(),
    };
    let bytes = state.codec.encode(&closed)?;
    for binding in state.binder.drop_room(&room_id).await {
        let _ = binding.sender.send(bytes.clone());
    }
    tracing::info!(%room_id, "room closed");
    Ok(())
}

/// The shape of every in-room command: look up the room, run the
/// mutation under its lock, broadcast on success, report on failure.
async fn apply<F>(
    state: &Arc<AppState>,
    outbound: &UnboundedSender<Vec<u8>>,
    room_id: &RoomId,
    mutate: F,
) -> Result<(), QuizroomError>
where
    F: FnOnce(&mut Room) -> Result<(), RoomError>,
{
    let shared = match state.rooms.get(room_id).await {
        Ok(shared) => shared,
        Err(e) => return send_room_error(state, outbound, &e),
    };
    let mut room = shared.lock().await;
    match mutate(&mut room) {
        Ok(()) => broadcast_room(state, &room).await,
        Err(e) => {
            tracing::debug!(%room_id, error = %e, "command rejected");
            send_room_error(state, outbound, &e)
        }
    }
}

/// Connection loss: flip the player to disconnected, tell the room, and
/// if the host just left, arm the grace timer that will promote a
/// replacement.
pub(crate) async fn handle_disconnect(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
) -> Result<(), QuizroomError> {
    let Some(binding) = state.binder.unbind(connection_id).await else {
        return Ok(());
    };
    let Ok(shared) = state.rooms.get(&binding.room_id).await else {
        // Room already closed; nothing to update.
        return Ok(());
    };

    let host_left = {
        let mut room = shared.lock().await;
        let host_left = room.mark_disconnected(&binding.player_id);
        broadcast_room(state, &room).await?;
        host_left
    };

    if host_left {
        let expiry_state = Arc::clone(state);
        let room_id = binding.room_id.clone();
        state
            .continuity
            .arm(binding.room_id.clone(), async move {
                promote_replacement_host(&expiry_state, &room_id).await;
            })
            .await;
    }
    Ok(())
}

/// Grace-timer expiry: if the host is still gone, promote the first
/// connected player and broadcast the new roster.
async fn promote_replacement_host(state: &Arc<AppState>, room_id: &RoomId) {
    let Ok(shared) = state.rooms.get(room_id).await else {
        return;
    };
    let mut room = shared.lock().await;
    if room.host_connected() {
        // The host slipped back in between expiry and this lock.
        return;
    }
    if room.reassign_host().is_some() {
        if let Err(e) = broadcast_room(state, &room).await {
            tracing::warn!(%room_id, error = %e, "host promotion broadcast failed");
        }
    } else {
        tracing::info!(%room_id, "no connected players to promote");
    }
}

/// Pushes a per-recipient snapshot to every connection bound to the
/// room. Must be called with the room's lock held, so successive
/// broadcasts can't interleave.
async fn broadcast_room(
    state: &AppState,
    room: &Room,
) -> Result<(), QuizroomError> {
    for (_, binding) in state.binder.members_of(&room.room_id).await {
        let event = ServerEvent::RoomState {
            room_state: room.snapshot_for(Some(&binding.player_id)),
        };
        let bytes = state.codec.encode(&event)?;
        // A full queue can't happen (unbounded); a closed receiver
        // means the connection is mid-teardown and will unbind itself.
        let _ = binding.sender.send(bytes);
    }
    Ok(())
}

fn send_event(
    state: &AppState,
    outbound: &UnboundedSender<Vec<u8>>,
    event: &ServerEvent,
) -> Result<(), QuizroomError> {
    let bytes = state.codec.encode(event)?;
    let _ = outbound.send(bytes);
    Ok(())
}

fn send_room_error(
    state: &AppState,
    outbound: &UnboundedSender<Vec<u8>>,
    error: &RoomError,
) -> Result<(), QuizroomError> {
    send_error(state, outbound, error.code(), &error.to_string())
}

pub(crate) fn send_error(
    state: &AppState,
    outbound: &UnboundedSender<Vec<u8>>,
    code: ErrorCode,
    message: &str,
) -> Result<(), QuizroomError> {
    send_event(
        state,
        outbound,
        &ServerEvent::Error {
            code,
            message: message.to_string(),
        },
    )
}
