//! # Quizroom
//!
//! WebSocket server for live multiplayer quiz rooms.
//!
//! A host creates a room, players join by its six-character code, and
//! the server holds the only authoritative copy of the game: questions,
//! submissions, scores, and who is host. Clients send commands and get
//! full-state snapshots back, redacted per recipient so players never
//! see an answer before the host reveals it.
//!
//! The layers, bottom to top: `quizroom-protocol` (wire types and
//! codec), `quizroom-room` (state machine, scoring, snapshots),
//! `quizroom-session` (socket-to-player bindings, host grace timers),
//! and this crate (the server loop that ties them together).

mod dispatch;
mod error;
mod handler;
mod server;
mod state;

pub use error::QuizroomError;
pub use server::{QuizroomServer, QuizroomServerBuilder};
