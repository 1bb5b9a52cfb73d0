//! Error types for the room layer.
//!
//! Every variant is a *reported* error: it reaches only the originating
//! connection and never mutates state. The intentional silent no-ops
//! (submission eligibility, double-confirm) are not errors and don't
//! appear here.

use quizroom_protocol::{ErrorCode, PlayerId, RoomId, ScoringMode};

/// Errors that can occur while applying a command to a room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The player is not in this room's roster.
    #[error("player {0} is not in room {1}")]
    PlayerNotFound(PlayerId, RoomId),

    /// No question exists at the given position.
    #[error("no question at round {round}, question {question}")]
    QuestionNotFound { round: u32, question: u32 },

    /// A host-only command came from someone else.
    #[error("only the host can do that")]
    NotHost(PlayerId),

    /// StartGame with unready connected players.
    #[error("all players must be ready before starting")]
    NotAllReady,

    /// StartGame outside the lobby.
    #[error("the game has already started")]
    NotInLobby,

    /// NextQuestion outside a running game.
    #[error("the game is not in progress")]
    NotInProgress,

    /// Editing the current or a past question after the game started.
    #[error("that question can no longer be edited")]
    QuestionFrozen,

    /// Mark/pick command in a scoring mode that doesn't support it.
    #[error("scoring mode {0} does not allow that")]
    WrongMode(ScoringMode),

    /// ConfirmResults in fastest-submit mode without a correct answer.
    #[error("set the correct answer before confirming results")]
    MissingCorrectAnswer,

    /// NextQuestion while the current question is unconfirmed.
    #[error("confirm results before advancing")]
    NotConfirmed,
}

impl RoomError {
    /// Maps the error onto the coarse wire-level code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound(_) => ErrorCode::RoomNotFound,
            Self::PlayerNotFound(..) | Self::QuestionNotFound { .. } => {
                ErrorCode::NotFound
            }
            Self::NotHost(_) => ErrorCode::NotHost,
            Self::NotAllReady
            | Self::NotInLobby
            | Self::NotInProgress
            | Self::QuestionFrozen
            | Self::WrongMode(_)
            | Self::MissingCorrectAnswer
            | Self::NotConfirmed => ErrorCode::StateGuard,
        }
    }
}
