//! Room settings: the immutable configuration chosen at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a question's points are decided.
///
/// Serialized in the kebab-case form the web client sends
/// (`"fastest-correct"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Host marks submissions correct; the fastest marked ones win.
    FastestCorrect,
    /// Submissions are auto-checked against the configured answer;
    /// the fastest matching ones win.
    FastestSubmit,
    /// Host hand-picks the winners in order.
    HostPicks,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastestCorrect => write!(f, "fastest-correct"),
            Self::FastestSubmit => write!(f, "fastest-submit"),
            Self::HostPicks => write!(f, "host-picks"),
        }
    }
}

/// Immutable per-room configuration, fixed when the room is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Number of rounds in the game.
    pub rounds: u32,

    /// Number of questions per round. The question bank has exactly
    /// `rounds * questions_per_round` entries, never resized.
    pub questions_per_round: u32,

    /// How points are awarded.
    pub scoring_mode: ScoringMode,

    /// Which finishing positions earn points (rank 1 always included).
    /// Ranks outside 1..=3 are ignored by the scoring engine.
    #[serde(default)]
    pub scoring_positions: Vec<u8>,

    /// If `true`, a player's first submission on a question is also
    /// their last.
    #[serde(default)]
    pub lock_after_submit: bool,
}

impl RoomSettings {
    /// Returns a copy with defaults filled in: an absent or empty
    /// `scoring_positions` list becomes `[1, 2, 3]`.
    pub fn normalized(mut self) -> Self {
        if self.scoring_positions.is_empty() {
            self.scoring_positions = vec![1, 2, 3];
        }
        self
    }

    /// Total number of questions in the bank.
    pub fn question_count(&self) -> u32 {
        self.rounds * self.questions_per_round
    }
}
