//! Authoritative game state for Quizroom.
//!
//! This crate owns everything about a room except the sockets: the data
//! model, the command state machine, the scoring engine, per-recipient
//! snapshot redaction, and the in-memory registry. The server crate
//! translates wire commands into calls here and broadcasts the
//! snapshots back out.

mod error;

pub mod engine;
pub mod model;
pub mod scoring;
pub mod snapshot;
pub mod store;

pub use engine::{QuestionPatch, SubmitOutcome};
pub use error::RoomError;
pub use model::{Player, Question, QuestionResult, Room, RoomStatus, Submission};
pub use snapshot::ServerEvent;
pub use store::{RoomStore, SharedRoom};
