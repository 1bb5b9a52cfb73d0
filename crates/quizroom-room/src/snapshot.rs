//! Outbound events and per-recipient snapshot redaction.
//!
//! Every accepted mutation is followed by a full-state broadcast; there
//! are no deltas. The one piece of state that differs per recipient is
//! the correct answer on each question, which only the host may see
//! before results are revealed.

use serde::{Deserialize, Serialize};

use quizroom_protocol::{ErrorCode, PlayerId, RoomId};

use crate::model::Room;

impl Room {
    /// Produces the snapshot a particular recipient is allowed to see.
    ///
    /// Non-host viewers (including `None`, an unbound connection) get
    /// every question's `correctAnswer` blanked. Everything else is
    /// shared verbatim.
    pub fn snapshot_for(&self, viewer: Option<&PlayerId>) -> Room {
        let mut snapshot = self.clone();
        let is_host = viewer.is_some_and(|v| v == &self.host_id);
        if !is_host {
            for question in &mut snapshot.questions {
                question.correct_answer.clear();
            }
        }
        snapshot
    }
}

/// Server-to-client events. Tagged the same way as commands, with the
/// room snapshot embedded where the client needs one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Reply to `CREATE_ROOM`, sent to the creator.
    #[serde(rename = "ROOM_CREATED", rename_all = "camelCase")]
    RoomCreated { room_id: RoomId, room_state: Room },

    /// Reply to `JOIN_ROOM` / `REJOIN_ROOM`, sent to the joiner.
    #[serde(rename = "JOINED", rename_all = "camelCase")]
    Joined {
        room_id: RoomId,
        player_id: PlayerId,
        room_state: Room,
    },

    /// Full-state broadcast after any accepted mutation.
    #[serde(rename = "ROOM_STATE", rename_all = "camelCase")]
    RoomState { room_state: Room },

    /// The host closed the room; all bindings are dropped.
    #[serde(rename = "ROOM_CLOSED", rename_all = "camelCase")]
    RoomClosed { room_id: RoomId },

    /// A rejected command, sent only to the sender.
    #[serde(rename = "ERROR", rename_all = "camelCase")]
    Error { code: ErrorCode, message: String },
}
