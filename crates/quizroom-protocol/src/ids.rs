//! Identifier newtypes used throughout Quizroom.
//!
//! All three identifiers are strings on the wire:
//!
//! - [`PlayerId`] is opaque and client-supplied. The client caches it
//!   locally and presents the same value after a reconnect, which is how
//!   a returning player is matched to their existing roster entry.
//! - [`RoomId`] is a short uppercase code generated by the server,
//!   designed to be read aloud or typed from another screen.
//! - [`SubmissionId`] is generated by the server when an answer is
//!   accepted and referenced later by the host's marking/picking
//!   commands.
//!
//! Wrapping them in newtypes keeps the signatures honest: a function
//! that wants a `RoomId` cannot be handed a player id by accident.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet for generated room codes. Uppercase letters and digits only,
/// so codes survive being shouted across a living room.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated room code.
const ROOM_CODE_LEN: usize = 6;

/// Length of a generated submission id.
const SUBMISSION_ID_LEN: usize = 10;

/// A client-supplied, stable identifier for a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the client supplied an empty id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A server-generated room code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Generates a fresh 6-character room code.
    ///
    /// Uniqueness is the caller's problem: the room store retries on the
    /// (unlikely) collision with an existing room.
    pub fn generate() -> Self {
        Self(random_string(ROOM_CODE_ALPHABET, ROOM_CODE_LEN))
    }

    /// Returns the raw code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A server-generated identifier for a single accepted answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    /// Generates a fresh 10-character submission id.
    pub fn generate() -> Self {
        const ALPHABET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        Self(random_string(ALPHABET, SUBMISSION_ID_LEN))
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_generate_has_expected_shape() {
        let id = RoomId::generate();
        assert_eq!(id.as_str().len(), 6);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_room_ids_are_not_constant() {
        // Collisions are possible in principle; 32 in a row is not.
        let ids: std::collections::HashSet<String> =
            (0..32).map(|_| RoomId::generate().0).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_submission_id_generate_has_expected_shape() {
        let id = SubmissionId::generate();
        assert_eq!(id.as_str().len(), 10);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }

    #[test]
    fn test_room_id_round_trips_through_json() {
        let id = RoomId::from("AB12CD");
        let json = serde_json::to_string(&id).unwrap();
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
