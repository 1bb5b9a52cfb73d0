//! The room data model.
//!
//! These are the structures the state machine mutates and the snapshot
//! broadcaster serializes. Field names follow the camelCase wire format
//! the web client expects (`roomId`, `hostId`, `isReady`, …).
//!
//! Everything here is plain data; the mutation rules live in
//! [`engine`](crate::engine) and the redaction rules in
//! [`snapshot`](crate::snapshot).

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use quizroom_protocol::{PlayerId, RoomId, RoomSettings, SubmissionId};

/// Milliseconds since the Unix epoch, the timestamp unit used on the
/// wire.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Room lifecycle state. Transitions are one-way:
///
/// ```text
/// lobby → in_progress → finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    InProgress,
    Finished,
}

/// One roster entry. Players are appended on first join and never
/// removed; disconnects only flip the `connected` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    /// Always `true` for the host; see [`Room::set_ready`].
    pub is_ready: bool,
    pub joined_at: u64,
    pub connected: bool,
}

/// A single accepted answer. Immutable once recorded; only the
/// question's [`QuestionResult`] (which references it by id) changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: SubmissionId,
    pub player_id: PlayerId,
    /// Display name at submission time, so the host panel doesn't
    /// change under a rename.
    pub name: String,
    pub answer: String,
    /// Computed at creation time, and only meaningful in
    /// fastest-submit mode.
    pub is_correct: bool,
    pub submitted_at: u64,
    /// 1-based arrival position, strictly increasing and gapless
    /// within a question.
    pub order: u32,
}

/// The host's verdicts on a question's submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    /// Marked-correct set (fastest-correct mode). Order is insertion
    /// order but carries no meaning.
    pub correct_submission_ids: Vec<SubmissionId>,
    /// Picked winners (host-picks mode), in pick order, bounded by the
    /// number of distinct valid scoring positions.
    pub winner_submission_ids: Vec<SubmissionId>,
}

/// One entry in the fixed question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub round_index: u32,
    pub question_index: u32,
    pub prompt: String,
    pub image_url: String,
    /// Blanked for non-host recipients when snapshots go out.
    pub correct_answer: String,
    /// One-way false → true; locking stops new submissions.
    pub locked: bool,
    pub submissions: Vec<Submission>,
    pub result: QuestionResult,
    /// One-way false → true; gates scoring exactly once.
    pub confirmed: bool,
}

impl Question {
    fn blank(round_index: u32, question_index: u32) -> Self {
        Self {
            round_index,
            question_index,
            prompt: String::new(),
            image_url: String::new(),
            correct_answer: String::new(),
            locked: false,
            submissions: Vec::new(),
            result: QuestionResult::default(),
            confirmed: false,
        }
    }
}

/// One game session's authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub room_name: String,
    /// Always identifies an entry in `players`, except transiently
    /// inside the host-reassignment computation.
    pub host_id: PlayerId,
    pub settings: RoomSettings,
    pub status: RoomStatus,
    pub current_round_index: u32,
    pub current_question_index: u32,
    /// Append-only membership, in join order.
    pub players: Vec<Player>,
    /// Fixed length `rounds * questions_per_round`, never resized.
    pub questions: Vec<Question>,
    /// Cumulative score table. Entries are created on first join and
    /// only ever increased.
    pub scores: BTreeMap<PlayerId, u32>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Room {
    /// Creates a room in the lobby with the creator as its host.
    ///
    /// `settings` should already be normalized
    /// ([`RoomSettings::normalized`]); the store takes care of that.
    pub fn new(
        room_id: RoomId,
        room_name: Option<String>,
        host_id: PlayerId,
        host_name: String,
        settings: RoomSettings,
    ) -> Self {
        let created_at = now_ms();
        let questions = (0..settings.rounds)
            .flat_map(|r| {
                (0..settings.questions_per_round)
                    .map(move |q| Question::blank(r, q))
            })
            .collect();

        let host = Player {
            id: host_id.clone(),
            name: host_name,
            is_host: true,
            is_ready: true,
            joined_at: created_at,
            connected: true,
        };

        let mut scores = BTreeMap::new();
        scores.insert(host_id.clone(), 0);

        Self {
            room_id,
            room_name: room_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Game Room".to_string()),
            host_id,
            settings,
            status: RoomStatus::Lobby,
            current_round_index: 0,
            current_question_index: 0,
            players: vec![host],
            questions,
            scores,
            created_at,
            updated_at: created_at,
        }
    }

    /// Absolute index of a question position within the bank.
    pub fn absolute_index(&self, round_index: u32, question_index: u32) -> u32 {
        round_index * self.settings.questions_per_round + question_index
    }

    /// Absolute index of the current position.
    pub fn current_absolute_index(&self) -> u32 {
        self.absolute_index(self.current_round_index, self.current_question_index)
    }

    /// The question at the current position.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_absolute_index() as usize)
    }

    pub(crate) fn current_question_mut(&mut self) -> Option<&mut Question> {
        let idx = self.current_absolute_index() as usize;
        self.questions.get_mut(idx)
    }

    /// Whether a position is inside the bank. Both bounds matter:
    /// `question_index` so a row can't alias into the next round, and
    /// `round_index` so the index math stays within `u32` for
    /// arbitrary client-supplied coordinates.
    fn in_bank(&self, round_index: u32, question_index: u32) -> bool {
        round_index < self.settings.rounds
            && question_index < self.settings.questions_per_round
    }

    /// The question at an explicit position.
    pub fn question_at(&self, round_index: u32, question_index: u32) -> Option<&Question> {
        if !self.in_bank(round_index, question_index) {
            return None;
        }
        self.questions
            .get(self.absolute_index(round_index, question_index) as usize)
    }

    pub(crate) fn question_at_mut(
        &mut self,
        round_index: u32,
        question_index: u32,
    ) -> Option<&mut Question> {
        if !self.in_bank(round_index, question_index) {
            return None;
        }
        let idx = self.absolute_index(round_index, question_index) as usize;
        self.questions.get_mut(idx)
    }

    /// Looks up a roster entry.
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    pub(crate) fn player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == player_id)
    }

    /// Returns `true` if the current host has a live connection.
    pub fn host_connected(&self) -> bool {
        self.player(&self.host_id).is_some_and(|p| p.connected)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}
