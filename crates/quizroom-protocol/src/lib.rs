//! Wire protocol for Quizroom.
//!
//! This crate defines the vocabulary shared by the server and its
//! clients:
//!
//! - **Identifiers** ([`RoomId`], [`PlayerId`], [`SubmissionId`])
//! - **Settings** ([`RoomSettings`], [`ScoringMode`]) — immutable room
//!   configuration carried in the create-room payload
//! - **Commands** ([`ClientCommand`]) and error codes ([`ErrorCode`])
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) for turning messages
//!   into socket frames and back
//!
//! Server → client events embed redacted room snapshots and therefore
//! live next to the room model in `quizroom-room`.

mod codec;
mod command;
mod error;
mod ids;
mod settings;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::{ClientCommand, ErrorCode};
pub use error::ProtocolError;
pub use ids::{PlayerId, RoomId, SubmissionId};
pub use settings::{RoomSettings, ScoringMode};
