//! The scoring engine: a pure function from a finalized question to
//! per-player point deltas.
//!
//! No part of this module touches the room; the state machine calls
//! [`compute_points_delta`] exactly once per question (confirmation is
//! idempotent upstream) and adds the deltas to the cumulative score
//! table. Deltas are never negative, so scores only ever grow.

use std::collections::BTreeMap;

use quizroom_protocol::{PlayerId, ScoringMode, SubmissionId};

use crate::model::Submission;

/// Points for a finishing position. Ranks outside 1..=3 score nothing
/// and are dropped when building the award sequence.
fn rank_points(rank: u8) -> Option<u32> {
    match rank {
        1 => Some(10),
        2 => Some(5),
        3 => Some(3),
        _ => None,
    }
}

/// Builds the ordered award sequence from the configured scoring
/// positions: deduplicate, drop unknown ranks, sort ascending, map to
/// point values. At most three entries.
pub fn build_awards(scoring_positions: &[u8]) -> Vec<u32> {
    let mut ranks: Vec<u8> = scoring_positions
        .iter()
        .copied()
        .filter(|r| rank_points(*r).is_some())
        .collect();
    ranks.sort_unstable();
    ranks.dedup();
    ranks
        .into_iter()
        .filter_map(rank_points)
        .collect()
}

/// Answer comparison key: trimmed and case-folded.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Computes the point delta each player earns from one question.
///
/// `submissions` must be in arrival order; the marked/picked collections
/// reference submissions by id. Players who earn nothing are absent from
/// the result.
pub fn compute_points_delta(
    scoring_mode: ScoringMode,
    submissions: &[Submission],
    correct_submission_ids: &[SubmissionId],
    winner_submission_ids: &[SubmissionId],
    correct_answer: &str,
    scoring_positions: &[u8],
) -> BTreeMap<PlayerId, u32> {
    let awards = build_awards(scoring_positions);
    let mut points: BTreeMap<PlayerId, u32> = BTreeMap::new();

    match scoring_mode {
        ScoringMode::FastestCorrect => {
            let ranked = submissions
                .iter()
                .filter(|s| correct_submission_ids.contains(&s.submission_id));
            for (submission, award) in ranked.zip(awards.iter()) {
                *points.entry(submission.player_id.clone()).or_insert(0) += award;
            }
        }

        ScoringMode::FastestSubmit => {
            let normalized = normalize_answer(correct_answer);
            if !normalized.is_empty() {
                let ranked = submissions
                    .iter()
                    .filter(|s| normalize_answer(&s.answer) == normalized);
                for (submission, award) in ranked.zip(awards.iter()) {
                    *points.entry(submission.player_id.clone()).or_insert(0) += award;
                }
            }
        }

        ScoringMode::HostPicks => {
            // Picked ids with no matching submission are skipped
            // silently; they consume their award position, matching the
            // host's on-screen ordering.
            for (id, award) in winner_submission_ids.iter().zip(awards.iter()) {
                if let Some(winner) =
                    submissions.iter().find(|s| &s.submission_id == id)
                {
                    *points.entry(winner.player_id.clone()).or_insert(0) += award;
                }
            }
        }
    }

    points
}
