//! The room state machine: every command's validation and mutation.
//!
//! All methods follow the same discipline: validate first, mutate only
//! when every guard passes (all-or-nothing), refresh `updated_at` on any
//! accepted mutation. Host-only commands take the acting player and
//! check it against `host_id` before anything else.
//!
//! One deliberate asymmetry: [`Room::submit_answer`] distinguishes
//! *ignored* submissions (expected races — two tabs, a late frame after
//! a lock) from *rejected* commands. Ignored submissions return
//! [`SubmitOutcome::Ignored`] and leave the room untouched without
//! surfacing an error to the sender.

use quizroom_protocol::{PlayerId, ScoringMode, SubmissionId};

use crate::model::{now_ms, Player, Room, RoomStatus, Submission};
use crate::scoring::{self, normalize_answer};
use crate::RoomError;

/// A partial edit to a question's content. Absent fields are left as
/// they are.
#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub correct_answer: Option<String>,
}

/// What happened to a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded with the next order number.
    Accepted,
    /// Silently dropped by an eligibility rule; the room is unchanged.
    Ignored,
}

impl Room {
    fn require_host(&self, actor: &PlayerId) -> Result<(), RoomError> {
        if &self.host_id == actor {
            Ok(())
        } else {
            Err(RoomError::NotHost(actor.clone()))
        }
    }

    /// Adds a player to the roster, or revives an existing entry.
    ///
    /// Joining is an upsert keyed on the client-supplied id: a returning
    /// player flips back to connected (optionally renaming themselves)
    /// instead of creating a duplicate. Score entries are created on
    /// first join and never removed.
    pub fn join(&mut self, player_id: PlayerId, name: Option<String>) {
        if let Some(existing) = self.player_mut(&player_id) {
            existing.connected = true;
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                existing.name = name;
            }
            tracing::debug!(room_id = %self.room_id, %player_id, "player rejoined");
        } else {
            let joined_at = now_ms();
            self.players.push(Player {
                id: player_id.clone(),
                name: name.unwrap_or_default(),
                is_host: false,
                is_ready: false,
                joined_at,
                connected: true,
            });
            self.scores.entry(player_id.clone()).or_insert(0);
            tracing::info!(
                room_id = %self.room_id,
                %player_id,
                players = self.players.len(),
                "player joined"
            );
        }
        self.touch();
    }

    /// Sets a player's ready flag. The host's flag is pinned: any value
    /// they send collapses to `true`.
    pub fn set_ready(
        &mut self,
        player_id: &PlayerId,
        is_ready: bool,
    ) -> Result<(), RoomError> {
        let is_host = &self.host_id == player_id;
        let room_id = self.room_id.clone();
        let player = self
            .player_mut(player_id)
            .ok_or_else(|| RoomError::PlayerNotFound(player_id.clone(), room_id))?;
        player.is_ready = if is_host { true } else { is_ready };
        self.touch();
        Ok(())
    }

    /// Host only: `lobby → in_progress`, provided every connected
    /// non-host player is ready. Disconnected players don't block the
    /// start.
    pub fn start_game(&mut self, actor: &PlayerId) -> Result<(), RoomError> {
        self.require_host(actor)?;
        if self.status != RoomStatus::Lobby {
            return Err(RoomError::NotInLobby);
        }
        let blocking = self
            .players
            .iter()
            .any(|p| !p.is_host && p.connected && !p.is_ready);
        if blocking {
            return Err(RoomError::NotAllReady);
        }
        self.status = RoomStatus::InProgress;
        self.current_round_index = 0;
        self.current_question_index = 0;
        self.touch();
        tracing::info!(room_id = %self.room_id, "game started");
        Ok(())
    }

    /// Returns `true` if the question at the given position may still
    /// be edited: everything in the lobby, only strictly-future
    /// questions once the game is running, nothing once finished.
    pub fn can_edit_question_at(&self, round_index: u32, question_index: u32) -> bool {
        match self.status {
            RoomStatus::Lobby => true,
            RoomStatus::Finished => false,
            RoomStatus::InProgress => {
                self.absolute_index(round_index, question_index)
                    > self.current_absolute_index()
            }
        }
    }

    /// Host only: edit a question addressed by position, subject to the
    /// edit guard.
    pub fn set_question_content(
        &mut self,
        actor: &PlayerId,
        round_index: u32,
        question_index: u32,
        patch: QuestionPatch,
    ) -> Result<(), RoomError> {
        self.require_host(actor)?;
        if self.question_at(round_index, question_index).is_none() {
            return Err(RoomError::QuestionNotFound {
                round: round_index,
                question: question_index,
            });
        }
        if !self.can_edit_question_at(round_index, question_index) {
            return Err(RoomError::QuestionFrozen);
        }
        // Guards passed; the unwrap-free double lookup keeps the borrow
        // checker happy without cloning the question.
        if let Some(question) = self.question_at_mut(round_index, question_index) {
            if let Some(prompt) = patch.prompt {
                question.prompt = prompt;
            }
            if let Some(image_url) = patch.image_url {
                question.image_url = image_url;
            }
            if let Some(correct_answer) = patch.correct_answer {
                question.correct_answer = correct_answer;
            }
        }
        self.touch();
        Ok(())
    }

    /// Host only: edit the current question (the SET_PROMPT command).
    /// Runs through the same edit guard, so it only succeeds in the
    /// lobby — once a question is being served it is frozen.
    pub fn set_current_question_content(
        &mut self,
        actor: &PlayerId,
        patch: QuestionPatch,
    ) -> Result<(), RoomError> {
        let (round_index, question_index) =
            (self.current_round_index, self.current_question_index);
        self.set_question_content(actor, round_index, question_index, patch)
    }

    /// Records an answer, or silently ignores it.
    ///
    /// Eligibility is checked in a fixed order; the first failing rule
    /// wins. An unknown player is a reported error (not a silent drop):
    /// they were never part of the room at all.
    pub fn submit_answer(
        &mut self,
        player_id: &PlayerId,
        answer: String,
    ) -> Result<SubmitOutcome, RoomError> {
        let player_name = self
            .player(player_id)
            .ok_or_else(|| {
                RoomError::PlayerNotFound(player_id.clone(), self.room_id.clone())
            })?
            .name
            .clone();

        if self.status != RoomStatus::InProgress {
            return Ok(SubmitOutcome::Ignored);
        }

        let lock_after_submit = self.settings.lock_after_submit;
        let scoring_mode = self.settings.scoring_mode;

        let Some(question) = self.current_question() else {
            return Ok(SubmitOutcome::Ignored);
        };
        if question.locked {
            return Ok(SubmitOutcome::Ignored);
        }

        let mine: Vec<&Submission> = question
            .submissions
            .iter()
            .filter(|s| &s.player_id == player_id)
            .collect();

        if lock_after_submit && !mine.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        // Mode-specific re-submission block: once a player's answer has
        // been judged correct (or picked), further attempts are noise.
        let already_settled = match scoring_mode {
            ScoringMode::FastestSubmit => mine.iter().any(|s| s.is_correct),
            ScoringMode::FastestCorrect => mine.iter().any(|s| {
                question
                    .result
                    .correct_submission_ids
                    .contains(&s.submission_id)
            }),
            ScoringMode::HostPicks => mine.iter().any(|s| {
                question
                    .result
                    .winner_submission_ids
                    .contains(&s.submission_id)
            }),
        };
        if already_settled {
            return Ok(SubmitOutcome::Ignored);
        }

        let is_correct = scoring_mode == ScoringMode::FastestSubmit
            && !normalize_answer(&question.correct_answer).is_empty()
            && normalize_answer(&answer)
                == normalize_answer(&question.correct_answer);

        let submitted_at = now_ms();
        let Some(question) = self.current_question_mut() else {
            return Ok(SubmitOutcome::Ignored);
        };
        let order = question.submissions.len() as u32 + 1;
        question.submissions.push(Submission {
            submission_id: SubmissionId::generate(),
            player_id: player_id.clone(),
            name: player_name,
            answer,
            is_correct,
            submitted_at,
            order,
        });
        self.touch();
        Ok(SubmitOutcome::Accepted)
    }

    /// Host only: stop accepting submissions on the current question.
    /// Already-recorded submissions are unaffected.
    pub fn lock_submissions(&mut self, actor: &PlayerId) -> Result<(), RoomError> {
        self.require_host(actor)?;
        let (round, question_idx) =
            (self.current_round_index, self.current_question_index);
        let question = self.current_question_mut().ok_or(
            RoomError::QuestionNotFound {
                round,
                question: question_idx,
            },
        )?;
        question.locked = true;
        self.touch();
        Ok(())
    }

    /// Host only, fastest-correct mode: toggle a submission's
    /// membership in the marked-correct set. A pure set update with no
    /// ordering semantics.
    pub fn mark_correct(
        &mut self,
        actor: &PlayerId,
        submission_id: &SubmissionId,
        is_correct: bool,
    ) -> Result<(), RoomError> {
        self.require_host(actor)?;
        if self.settings.scoring_mode != ScoringMode::FastestCorrect {
            return Err(RoomError::WrongMode(self.settings.scoring_mode));
        }
        let (round, question_idx) =
            (self.current_round_index, self.current_question_index);
        let question = self.current_question_mut().ok_or(
            RoomError::QuestionNotFound {
                round,
                question: question_idx,
            },
        )?;
        let marked = &mut question.result.correct_submission_ids;
        if is_correct {
            if !marked.contains(submission_id) {
                marked.push(submission_id.clone());
            }
        } else {
            marked.retain(|id| id != submission_id);
        }
        self.touch();
        Ok(())
    }

    /// Host only, host-picks mode: toggle a submission in or out of the
    /// ordered winner list. Toggling off preserves the relative order of
    /// the rest; toggling on appends only while the list is below the
    /// number of distinct valid scoring positions.
    pub fn pick_winner(
        &mut self,
        actor: &PlayerId,
        submission_id: &SubmissionId,
    ) -> Result<(), RoomError> {
        self.require_host(actor)?;
        if self.settings.scoring_mode != ScoringMode::HostPicks {
            return Err(RoomError::WrongMode(self.settings.scoring_mode));
        }
        let capacity = scoring::build_awards(&self.settings.scoring_positions).len();
        let (round, question_idx) =
            (self.current_round_index, self.current_question_index);
        let question = self.current_question_mut().ok_or(
            RoomError::QuestionNotFound {
                round,
                question: question_idx,
            },
        )?;
        let winners = &mut question.result.winner_submission_ids;
        if winners.contains(submission_id) {
            winners.retain(|id| id != submission_id);
        } else if winners.len() < capacity {
            winners.push(submission_id.clone());
        }
        self.touch();
        Ok(())
    }

    /// Host only: finalize the current question and apply scoring.
    ///
    /// Idempotent — a second confirm is a no-op returning `Ok(false)`,
    /// which is what makes the non-idempotent scoring engine safe to
    /// call from here. In fastest-submit mode a correct answer must be
    /// configured first.
    pub fn confirm_results(&mut self, actor: &PlayerId) -> Result<bool, RoomError> {
        self.require_host(actor)?;
        let (round, question_idx) =
            (self.current_round_index, self.current_question_index);
        let question =
            self.current_question().ok_or(RoomError::QuestionNotFound {
                round,
                question: question_idx,
            })?;
        if question.confirmed {
            return Ok(false);
        }
        if self.settings.scoring_mode == ScoringMode::FastestSubmit
            && normalize_answer(&question.correct_answer).is_empty()
        {
            return Err(RoomError::MissingCorrectAnswer);
        }

        let delta = scoring::compute_points_delta(
            self.settings.scoring_mode,
            &question.submissions,
            &question.result.correct_submission_ids,
            &question.result.winner_submission_ids,
            &question.correct_answer,
            &self.settings.scoring_positions,
        );
        for (player_id, points) in delta {
            *self.scores.entry(player_id).or_insert(0) += points;
        }

        if let Some(question) = self.current_question_mut() {
            question.confirmed = true;
        }
        self.touch();
        tracing::debug!(
            room_id = %self.room_id,
            round = round,
            question = question_idx,
            "results confirmed"
        );
        Ok(true)
    }

    /// Host only: advance to the next question. The current question
    /// must be confirmed. Invoked on the last question of the last
    /// round, this finishes the game instead of moving the position.
    pub fn next_question(&mut self, actor: &PlayerId) -> Result<(), RoomError> {
        self.require_host(actor)?;
        if self.status != RoomStatus::InProgress {
            return Err(RoomError::NotInProgress);
        }
        if let Some(current) = self.current_question() {
            if !current.confirmed {
                return Err(RoomError::NotConfirmed);
            }
        }
        if self.current_question_index + 1 < self.settings.questions_per_round {
            self.current_question_index += 1;
        } else if self.current_round_index + 1 < self.settings.rounds {
            self.current_round_index += 1;
            self.current_question_index = 0;
        } else {
            self.status = RoomStatus::Finished;
            tracing::info!(room_id = %self.room_id, "game finished");
        }
        self.touch();
        Ok(())
    }

    /// Host only: end the game immediately, whatever the position.
    pub fn end_game(&mut self, actor: &PlayerId) -> Result<(), RoomError> {
        self.require_host(actor)?;
        self.status = RoomStatus::Finished;
        self.touch();
        tracing::info!(room_id = %self.room_id, "game ended by host");
        Ok(())
    }

    /// Marks a player as disconnected. Returns `true` if the
    /// disconnecting player was the host, in which case the caller
    /// should arm the host-continuity timer.
    pub fn mark_disconnected(&mut self, player_id: &PlayerId) -> bool {
        if let Some(player) = self.player_mut(player_id) {
            player.connected = false;
            self.touch();
            &self.host_id == player_id
        } else {
            false
        }
    }

    /// Promotes the first still-connected player (in join order) to
    /// host. Called by the continuity supervisor when the grace period
    /// elapses with the host still gone.
    ///
    /// Returns the new host's id, or `None` when nobody is connected —
    /// in that case the room is left idle with its host unchanged.
    pub fn reassign_host(&mut self) -> Option<PlayerId> {
        let next = self
            .players
            .iter()
            .find(|p| p.connected)
            .map(|p| p.id.clone())?;
        self.host_id = next.clone();
        for player in &mut self.players {
            player.is_host = player.id == next;
            if player.is_host {
                player.is_ready = true;
            }
        }
        self.touch();
        tracing::info!(room_id = %self.room_id, new_host = %next, "host reassigned");
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::{PlayerId, RoomId, RoomSettings};

    fn pid(p: &str) -> PlayerId {
        PlayerId::from(p)
    }

    fn make_room(mode: ScoringMode, rounds: u32, per_round: u32) -> Room {
        let settings = RoomSettings {
            rounds,
            questions_per_round: per_round,
            scoring_mode: mode,
            scoring_positions: vec![1, 2, 3],
            lock_after_submit: false,
        };
        let mut room = Room::new(
            RoomId::from("ROOM01"),
            None,
            pid("host"),
            "Host".into(),
            settings,
        );
        room.join(pid("p1"), Some("One".into()));
        room.join(pid("p2"), Some("Two".into()));
        room
    }

    fn started(mode: ScoringMode) -> Room {
        let mut room = make_room(mode, 1, 2);
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();
        room
    }

    // -- join / ready ------------------------------------------------------

    #[test]
    fn test_join_is_an_upsert_keyed_on_player_id() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        assert_eq!(room.players.len(), 3);

        room.mark_disconnected(&pid("p1"));
        assert!(!room.player(&pid("p1")).unwrap().connected);

        room.join(pid("p1"), Some("One Renamed".into()));
        assert_eq!(room.players.len(), 3, "rejoin must not duplicate");
        let p1 = room.player(&pid("p1")).unwrap();
        assert!(p1.connected);
        assert_eq!(p1.name, "One Renamed");
    }

    #[test]
    fn test_rejoin_without_name_keeps_existing_name() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        room.join(pid("p1"), None);
        assert_eq!(room.player(&pid("p1")).unwrap().name, "One");
    }

    #[test]
    fn test_set_ready_pins_host_to_true() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        room.set_ready(&pid("host"), false).unwrap();
        assert!(room.player(&pid("host")).unwrap().is_ready);
    }

    #[test]
    fn test_set_ready_unknown_player_is_not_found() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        let err = room.set_ready(&pid("ghost"), true).unwrap_err();
        assert!(matches!(err, RoomError::PlayerNotFound(..)));
    }

    // -- start guards ------------------------------------------------------

    #[test]
    fn test_start_requires_host() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        let err = room.start_game(&pid("p1")).unwrap_err();
        assert!(matches!(err, RoomError::NotHost(_)));
    }

    #[test]
    fn test_start_requires_all_connected_players_ready() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        room.set_ready(&pid("p1"), true).unwrap();
        // p2 not ready.
        let err = room.start_game(&pid("host")).unwrap_err();
        assert!(matches!(err, RoomError::NotAllReady));
    }

    #[test]
    fn test_start_ignores_disconnected_unready_players() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        room.set_ready(&pid("p1"), true).unwrap();
        room.mark_disconnected(&pid("p2"));
        room.start_game(&pid("host")).unwrap();
        assert_eq!(room.status, RoomStatus::InProgress);
    }

    #[test]
    fn test_start_twice_is_a_state_guard_error() {
        let mut room = started(ScoringMode::FastestCorrect);
        // Advance off the initial position, then try to restart.
        room.confirm_results(&pid("host")).unwrap();
        room.next_question(&pid("host")).unwrap();
        let err = room.start_game(&pid("host")).unwrap_err();
        assert!(matches!(err, RoomError::NotInLobby));
        assert_eq!(room.current_question_index, 1, "position must not reset");
    }

    // -- edit guard --------------------------------------------------------

    #[test]
    fn test_any_question_editable_in_lobby() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 2);
        room.set_question_content(
            &pid("host"),
            0,
            0,
            QuestionPatch {
                prompt: Some("Q1?".into()),
                ..QuestionPatch::default()
            },
        )
        .unwrap();
        assert_eq!(room.questions[0].prompt, "Q1?");
    }

    #[test]
    fn test_current_question_frozen_in_progress() {
        let mut room = started(ScoringMode::FastestCorrect);
        let err = room
            .set_question_content(
                &pid("host"),
                0,
                0,
                QuestionPatch {
                    prompt: Some("changed".into()),
                    ..QuestionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RoomError::QuestionFrozen));
        assert_eq!(room.questions[0].prompt, "");
    }

    #[test]
    fn test_future_question_editable_in_progress() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.set_question_content(
            &pid("host"),
            0,
            1,
            QuestionPatch {
                correct_answer: Some("42".into()),
                ..QuestionPatch::default()
            },
        )
        .unwrap();
        assert_eq!(room.questions[1].correct_answer, "42");
    }

    #[test]
    fn test_nothing_editable_when_finished() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.end_game(&pid("host")).unwrap();
        let err = room
            .set_question_content(
                &pid("host"),
                0,
                1,
                QuestionPatch::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RoomError::QuestionFrozen));
    }

    #[test]
    fn test_edit_out_of_bounds_is_not_found() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 2);
        let err = room
            .set_question_content(&pid("host"), 5, 0, QuestionPatch::default())
            .unwrap_err();
        assert!(matches!(err, RoomError::QuestionNotFound { .. }));
    }

    #[test]
    fn test_edit_with_huge_round_index_is_not_found() {
        // A round index past 2^31 would overflow the bank index math if
        // it were computed; it must be rejected as NotFound instead.
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 2);
        let err = room
            .set_question_content(
                &pid("host"),
                2_147_483_648,
                0,
                QuestionPatch {
                    prompt: Some("?".into()),
                    ..QuestionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RoomError::QuestionNotFound { .. }));
        assert_eq!(room.questions[0].prompt, "", "question 0 untouched");
    }

    // -- submissions -------------------------------------------------------

    #[test]
    fn test_submission_orders_are_gapless_from_one() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.submit_answer(&pid("p1"), "a".into()).unwrap();
        room.submit_answer(&pid("p2"), "b".into()).unwrap();
        room.submit_answer(&pid("p1"), "c".into()).unwrap();
        let orders: Vec<u32> = room.current_question().unwrap()
            .submissions
            .iter()
            .map(|s| s.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_submit_in_lobby_is_ignored() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        let outcome = room.submit_answer(&pid("p1"), "a".into()).unwrap();
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(room.questions[0].submissions.is_empty());
    }

    #[test]
    fn test_submit_after_lock_is_ignored() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.lock_submissions(&pid("host")).unwrap();
        let outcome = room.submit_answer(&pid("p1"), "a".into()).unwrap();
        assert_eq!(outcome, SubmitOutcome::Ignored);
    }

    #[test]
    fn test_lock_keeps_existing_submissions() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.submit_answer(&pid("p1"), "a".into()).unwrap();
        room.lock_submissions(&pid("host")).unwrap();
        assert_eq!(room.current_question().unwrap().submissions.len(), 1);
    }

    #[test]
    fn test_unknown_player_submission_is_reported() {
        let mut room = started(ScoringMode::FastestCorrect);
        let err = room.submit_answer(&pid("ghost"), "a".into()).unwrap_err();
        assert!(matches!(err, RoomError::PlayerNotFound(..)));
    }

    #[test]
    fn test_lock_after_submit_blocks_second_attempt() {
        let mut room = make_room(ScoringMode::FastestCorrect, 1, 1);
        room.settings.lock_after_submit = true;
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();

        assert_eq!(
            room.submit_answer(&pid("p1"), "first".into()).unwrap(),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            room.submit_answer(&pid("p1"), "second".into()).unwrap(),
            SubmitOutcome::Ignored
        );
        assert_eq!(room.current_question().unwrap().submissions.len(), 1);
    }

    #[test]
    fn test_fastest_submit_flags_and_blocks_after_correct() {
        let mut room = make_room(ScoringMode::FastestSubmit, 1, 1);
        room.set_question_content(
            &pid("host"),
            0,
            0,
            QuestionPatch {
                correct_answer: Some("Paris".into()),
                ..QuestionPatch::default()
            },
        )
        .unwrap();
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();

        room.submit_answer(&pid("p1"), "  paris ".into()).unwrap();
        let question = room.current_question().unwrap();
        assert!(question.submissions[0].is_correct);

        // Already correct → further submissions ignored.
        assert_eq!(
            room.submit_answer(&pid("p1"), "paris".into()).unwrap(),
            SubmitOutcome::Ignored
        );

        // Wrong answers from others are still recorded, unflagged.
        room.submit_answer(&pid("p2"), "london".into()).unwrap();
        let question = room.current_question().unwrap();
        assert_eq!(question.submissions.len(), 2);
        assert!(!question.submissions[1].is_correct);
    }

    #[test]
    fn test_fastest_correct_blocks_after_marked() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.submit_answer(&pid("p1"), "a".into()).unwrap();
        let sub_id = room.current_question().unwrap().submissions[0]
            .submission_id
            .clone();
        room.mark_correct(&pid("host"), &sub_id, true).unwrap();
        assert_eq!(
            room.submit_answer(&pid("p1"), "again".into()).unwrap(),
            SubmitOutcome::Ignored
        );
        // An unmarked player can keep submitting.
        assert_eq!(
            room.submit_answer(&pid("p2"), "b".into()).unwrap(),
            SubmitOutcome::Accepted
        );
    }

    // -- mark / pick -------------------------------------------------------

    #[test]
    fn test_mark_correct_requires_matching_mode() {
        let mut room = started(ScoringMode::HostPicks);
        let err = room
            .mark_correct(&pid("host"), &SubmissionId::from("x"), true)
            .unwrap_err();
        assert!(matches!(err, RoomError::WrongMode(ScoringMode::HostPicks)));
    }

    #[test]
    fn test_mark_correct_toggles_set_membership() {
        let mut room = started(ScoringMode::FastestCorrect);
        let id = SubmissionId::from("s1");
        room.mark_correct(&pid("host"), &id, true).unwrap();
        room.mark_correct(&pid("host"), &id, true).unwrap();
        assert_eq!(
            room.current_question().unwrap().result.correct_submission_ids,
            vec![id.clone()],
            "marking twice must not duplicate"
        );
        room.mark_correct(&pid("host"), &id, false).unwrap();
        assert!(room
            .current_question()
            .unwrap()
            .result
            .correct_submission_ids
            .is_empty());
    }

    #[test]
    fn test_pick_winner_toggle_preserves_order_and_capacity() {
        let mut room = make_room(ScoringMode::HostPicks, 1, 1);
        room.settings.scoring_positions = vec![1, 2];
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();

        let (a, b, c) = (
            SubmissionId::from("a"),
            SubmissionId::from("b"),
            SubmissionId::from("c"),
        );
        room.pick_winner(&pid("host"), &a).unwrap();
        room.pick_winner(&pid("host"), &b).unwrap();
        // Capacity 2: third pick is a no-op.
        room.pick_winner(&pid("host"), &c).unwrap();
        assert_eq!(
            room.current_question().unwrap().result.winner_submission_ids,
            vec![a.clone(), b.clone()]
        );
        // Toggling the first off keeps the rest in order and frees a slot.
        room.pick_winner(&pid("host"), &a).unwrap();
        room.pick_winner(&pid("host"), &c).unwrap();
        assert_eq!(
            room.current_question().unwrap().result.winner_submission_ids,
            vec![b, c]
        );
    }

    #[test]
    fn test_pick_winner_capacity_counts_distinct_valid_positions() {
        let mut room = make_room(ScoringMode::HostPicks, 1, 1);
        room.settings.scoring_positions = vec![1, 1, 7];
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();

        room.pick_winner(&pid("host"), &SubmissionId::from("a")).unwrap();
        room.pick_winner(&pid("host"), &SubmissionId::from("b")).unwrap();
        assert_eq!(
            room.current_question().unwrap().result.winner_submission_ids.len(),
            1,
            "duplicate and invalid ranks don't widen the list"
        );
    }

    // -- confirm / advance / finish ---------------------------------------

    #[test]
    fn test_confirm_applies_scores_once() {
        let mut room = make_room(ScoringMode::FastestSubmit, 1, 1);
        room.set_question_content(
            &pid("host"),
            0,
            0,
            QuestionPatch {
                correct_answer: Some("paris".into()),
                ..QuestionPatch::default()
            },
        )
        .unwrap();
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();
        room.submit_answer(&pid("p1"), "Paris".into()).unwrap();
        room.submit_answer(&pid("p2"), "london".into()).unwrap();

        assert!(room.confirm_results(&pid("host")).unwrap());
        assert_eq!(room.scores.get(&pid("p1")), Some(&10));
        assert_eq!(room.scores.get(&pid("p2")), Some(&0));

        // Second confirm: accepted, but a no-op.
        assert!(!room.confirm_results(&pid("host")).unwrap());
        assert_eq!(room.scores.get(&pid("p1")), Some(&10));
    }

    #[test]
    fn test_confirm_fastest_submit_requires_correct_answer() {
        let mut room = started(ScoringMode::FastestSubmit);
        let err = room.confirm_results(&pid("host")).unwrap_err();
        assert!(matches!(err, RoomError::MissingCorrectAnswer));
    }

    #[test]
    fn test_next_question_requires_confirmation() {
        let mut room = started(ScoringMode::FastestCorrect);
        let err = room.next_question(&pid("host")).unwrap_err();
        assert!(matches!(err, RoomError::NotConfirmed));
        assert_eq!(room.current_absolute_index(), 0, "position unchanged");
    }

    #[test]
    fn test_next_question_walks_rounds() {
        let mut room = make_room(ScoringMode::FastestCorrect, 2, 2);
        room.set_ready(&pid("p1"), true).unwrap();
        room.set_ready(&pid("p2"), true).unwrap();
        room.start_game(&pid("host")).unwrap();

        for expected in [(0, 1), (1, 0), (1, 1)] {
            room.confirm_results(&pid("host")).unwrap();
            room.next_question(&pid("host")).unwrap();
            assert_eq!(
                (room.current_round_index, room.current_question_index),
                expected
            );
        }
    }

    #[test]
    fn test_last_question_advance_finishes_game() {
        let mut room = started(ScoringMode::FastestCorrect); // 1 round, 2 questions
        room.confirm_results(&pid("host")).unwrap();
        room.next_question(&pid("host")).unwrap();
        room.confirm_results(&pid("host")).unwrap();
        room.next_question(&pid("host")).unwrap();

        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(
            (room.current_round_index, room.current_question_index),
            (0, 1),
            "position stays on the last question"
        );
    }

    #[test]
    fn test_scores_monotonically_non_decreasing() {
        let mut room = started(ScoringMode::FastestCorrect);
        room.submit_answer(&pid("p1"), "a".into()).unwrap();
        let sub = room.current_question().unwrap().submissions[0]
            .submission_id
            .clone();
        room.mark_correct(&pid("host"), &sub, true).unwrap();

        let before = room.scores.clone();
        room.confirm_results(&pid("host")).unwrap();
        for (player, old) in before {
            assert!(room.scores[&player] >= old);
        }
    }

    // -- host continuity ---------------------------------------------------

    #[test]
    fn test_exactly_one_host_after_every_command() {
        let mut room = started(ScoringMode::FastestCorrect);
        let host_count = |r: &Room| r.players.iter().filter(|p| p.is_host).count();
        assert_eq!(host_count(&room), 1);

        room.mark_disconnected(&pid("host"));
        room.reassign_host();
        assert_eq!(host_count(&room), 1);
        assert_eq!(room.host_id, pid("p1"), "first connected in join order");
        assert!(room.player(&pid("p1")).unwrap().is_ready);
    }

    #[test]
    fn test_reassign_with_nobody_connected_leaves_host() {
        let mut room = started(ScoringMode::FastestCorrect);
        for p in ["host", "p1", "p2"] {
            room.mark_disconnected(&pid(p));
        }
        assert!(room.reassign_host().is_none());
        assert_eq!(room.host_id, pid("host"));
    }

    #[test]
    fn test_mark_disconnected_reports_host_loss() {
        let mut room = started(ScoringMode::FastestCorrect);
        assert!(!room.mark_disconnected(&pid("p1")));
        assert!(room.mark_disconnected(&pid("host")));
        assert!(!room.mark_disconnected(&pid("ghost")));
    }
}
