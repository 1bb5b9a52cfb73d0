//! Client → server commands.
//!
//! Every inbound frame is one [`ClientCommand`], tagged with a
//! `"type"` field in SCREAMING_SNAKE_CASE and carrying camelCase
//! payload fields, e.g.:
//!
//! ```json
//! { "type": "SUBMIT_ANSWER", "roomId": "AB12CD", "playerId": "p1", "answer": "paris" }
//! ```
//!
//! A frame that fails to deserialize into this enum is a
//! malformed-request: the server replies with a `BAD_REQUEST` error and
//! mutates nothing. Missing required fields are therefore rejected
//! before any handler runs.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomId, RoomSettings, SubmissionId};

/// A command from a connected client.
///
/// Authorization (host-only commands, membership checks) is enforced by
/// the room state machine, not here — the protocol layer only cares
/// that the payload is well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Create a room; the creator becomes host.
    #[serde(rename = "CREATE_ROOM", rename_all = "camelCase")]
    CreateRoom {
        player_id: PlayerId,
        host_name: String,
        #[serde(default)]
        room_name: Option<String>,
        settings: RoomSettings,
    },

    /// Join a room for the first time (or return to one).
    #[serde(rename = "JOIN_ROOM", rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        player_id: PlayerId,
        name: String,
    },

    /// Rejoin after a reconnect. `name` is optional; omitting it keeps
    /// the existing display name.
    #[serde(rename = "REJOIN_ROOM", rename_all = "camelCase")]
    RejoinRoom {
        room_id: RoomId,
        player_id: PlayerId,
        #[serde(default)]
        name: Option<String>,
    },

    /// Toggle the ready flag. Ignored for the host, whose flag is
    /// pinned to `true`.
    #[serde(rename = "SET_READY", rename_all = "camelCase")]
    SetReady {
        room_id: RoomId,
        player_id: PlayerId,
        is_ready: bool,
    },

    /// Host only: start the game once every connected non-host player
    /// is ready.
    #[serde(rename = "START_GAME", rename_all = "camelCase")]
    StartGame {
        room_id: RoomId,
        player_id: PlayerId,
    },

    /// Host only: edit the *current* question's content. Each field is
    /// optional; absent fields are left untouched.
    #[serde(rename = "SET_PROMPT", rename_all = "camelCase")]
    SetPrompt {
        room_id: RoomId,
        player_id: PlayerId,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        correct_answer: Option<String>,
    },

    /// Host only: edit a question addressed by position.
    #[serde(rename = "SET_QUESTION_CONTENT", rename_all = "camelCase")]
    SetQuestionContent {
        room_id: RoomId,
        player_id: PlayerId,
        round_index: u32,
        question_index: u32,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        correct_answer: Option<String>,
    },

    /// Submit an answer to the current question.
    #[serde(rename = "SUBMIT_ANSWER", rename_all = "camelCase")]
    SubmitAnswer {
        room_id: RoomId,
        player_id: PlayerId,
        answer: String,
    },

    /// Host only: stop accepting submissions on the current question.
    #[serde(rename = "LOCK_SUBMISSIONS", rename_all = "camelCase")]
    LockSubmissions {
        room_id: RoomId,
        player_id: PlayerId,
    },

    /// Host only, fastest-correct mode: toggle a submission in or out
    /// of the marked-correct set.
    #[serde(rename = "MARK_CORRECT", rename_all = "camelCase")]
    MarkCorrect {
        room_id: RoomId,
        player_id: PlayerId,
        submission_id: SubmissionId,
        is_correct: bool,
    },

    /// Host only, host-picks mode: toggle a submission in or out of the
    /// ordered winner list.
    #[serde(rename = "PICK_WINNER", rename_all = "camelCase")]
    PickWinner {
        room_id: RoomId,
        player_id: PlayerId,
        submission_id: SubmissionId,
    },

    /// Host only: finalize the current question and apply scoring.
    #[serde(rename = "CONFIRM_RESULTS", rename_all = "camelCase")]
    ConfirmResults {
        room_id: RoomId,
        player_id: PlayerId,
    },

    /// Host only: advance to the next question (or finish the game on
    /// the last one).
    #[serde(rename = "NEXT_QUESTION", rename_all = "camelCase")]
    NextQuestion {
        room_id: RoomId,
        player_id: PlayerId,
    },

    /// Host only: end the game immediately.
    #[serde(rename = "END_GAME", rename_all = "camelCase")]
    EndGame {
        room_id: RoomId,
        player_id: PlayerId,
    },

    /// Host only: tear the room down — cancel timers, evict the room,
    /// notify every member.
    #[serde(rename = "CLOSE_ROOM", rename_all = "camelCase")]
    CloseRoom {
        room_id: RoomId,
        player_id: PlayerId,
    },
}

/// Coarse error categories reported back to the sender.
///
/// These mirror the error taxonomy: `BadRequest` for malformed frames,
/// `RoomNotFound`/`NotFound` for missing referents, `NotHost` for
/// authorization failures, and `StateGuard` for commands that are valid
/// but forbidden by the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    RoomNotFound,
    NotFound,
    NotHost,
    StateGuard,
}
