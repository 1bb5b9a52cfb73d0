//! End-to-end exercise of a full game against the room state machine,
//! the way the server drives it: create, join, ready, play through two
//! rounds, survive a host drop, and finish.

use quizroom_protocol::{PlayerId, RoomSettings, ScoringMode};
use quizroom_room::{QuestionPatch, Room, RoomStatus, RoomStore, SubmitOutcome};

fn pid(p: &str) -> PlayerId {
    PlayerId::from(p)
}

fn settings(mode: ScoringMode) -> RoomSettings {
    RoomSettings {
        rounds: 2,
        questions_per_round: 2,
        scoring_mode: mode,
        scoring_positions: vec![1, 2, 3],
        lock_after_submit: false,
    }
}

fn confirm_and_advance(room: &mut Room, host: &PlayerId) {
    room.confirm_results(host).unwrap();
    room.next_question(host).unwrap();
}

#[tokio::test]
async fn test_full_fastest_submit_game() {
    let store = RoomStore::new();
    let host = pid("host");
    let (room_id, shared) = store
        .create_room(
            Some("Friday Quiz".into()),
            host.clone(),
            "Alice".into(),
            settings(ScoringMode::FastestSubmit),
        )
        .await;
    assert_eq!(room_id.as_str().len(), 6);

    let mut room = shared.lock().await;
    room.join(pid("bob"), Some("Bob".into()));
    room.join(pid("cara"), Some("Cara".into()));

    // Host authors the whole bank in the lobby.
    let answers = ["paris", "berlin", "madrid", "rome"];
    for (i, answer) in answers.iter().enumerate() {
        room.set_question_content(
            &host,
            i as u32 / 2,
            i as u32 % 2,
            QuestionPatch {
                prompt: Some(format!("Capital #{}", i + 1)),
                correct_answer: Some((*answer).into()),
                ..QuestionPatch::default()
            },
        )
        .unwrap();
    }

    room.set_ready(&pid("bob"), true).unwrap();
    room.set_ready(&pid("cara"), true).unwrap();
    room.start_game(&host).unwrap();

    // Q1: Bob fastest correct, Cara wrong.
    room.submit_answer(&pid("bob"), " Paris".into()).unwrap();
    room.submit_answer(&pid("cara"), "london".into()).unwrap();
    room.lock_submissions(&host).unwrap();
    assert_eq!(
        room.submit_answer(&pid("cara"), "paris".into()).unwrap(),
        SubmitOutcome::Ignored
    );
    confirm_and_advance(&mut room, &host);
    assert_eq!(room.scores[&pid("bob")], 10);
    assert_eq!(room.scores[&pid("cara")], 0);

    // Q2: Cara first, Bob second, both correct.
    room.submit_answer(&pid("cara"), "Berlin".into()).unwrap();
    room.submit_answer(&pid("bob"), "berlin ".into()).unwrap();
    confirm_and_advance(&mut room, &host);
    assert_eq!(room.scores[&pid("cara")], 10);
    assert_eq!(room.scores[&pid("bob")], 15);
    assert_eq!(
        (room.current_round_index, room.current_question_index),
        (1, 0)
    );

    // Host drops mid-game; Bob (first connected in join order after
    // the host) takes over and play continues.
    assert!(room.mark_disconnected(&host));
    let new_host = room.reassign_host().unwrap();
    assert_eq!(new_host, pid("bob"));
    assert!(room.player(&pid("bob")).unwrap().is_host);

    // The old host's commands are now rejected.
    assert!(room.lock_submissions(&host).is_err());

    room.submit_answer(&pid("cara"), "madrid".into()).unwrap();
    confirm_and_advance(&mut room, &new_host);
    assert_eq!(room.scores[&pid("cara")], 20);

    // Final question, then the advance finishes the game.
    room.submit_answer(&pid("cara"), "rome".into()).unwrap();
    confirm_and_advance(&mut room, &new_host);
    assert_eq!(room.status, RoomStatus::Finished);

    // Finished rooms accept no further play.
    assert_eq!(
        room.submit_answer(&pid("cara"), "late".into()).unwrap(),
        SubmitOutcome::Ignored
    );
    drop(room);

    store.remove(&room_id).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_host_picks_round_with_redacted_snapshots() {
    let store = RoomStore::new();
    let host = pid("host");
    let (_, shared) = store
        .create_room(
            None,
            host.clone(),
            "Host".into(),
            RoomSettings {
                rounds: 1,
                questions_per_round: 1,
                scoring_mode: ScoringMode::HostPicks,
                scoring_positions: vec![1, 2],
                lock_after_submit: true,
            },
        )
        .await;

    let mut room = shared.lock().await;
    room.join(pid("p1"), Some("One".into()));
    room.join(pid("p2"), Some("Two".into()));
    room.set_question_content(
        &host,
        0,
        0,
        QuestionPatch {
            prompt: Some("Best pun?".into()),
            correct_answer: Some("(judged)".into()),
            ..QuestionPatch::default()
        },
    )
    .unwrap();
    room.set_ready(&pid("p1"), true).unwrap();
    room.set_ready(&pid("p2"), true).unwrap();
    room.start_game(&host).unwrap();

    room.submit_answer(&pid("p1"), "a fish pun".into()).unwrap();
    room.submit_answer(&pid("p2"), "a bread pun".into()).unwrap();
    // lockAfterSubmit: second attempts bounce.
    assert_eq!(
        room.submit_answer(&pid("p1"), "edit!".into()).unwrap(),
        SubmitOutcome::Ignored
    );

    let subs: Vec<_> = room
        .current_question()
        .unwrap()
        .submissions
        .iter()
        .map(|s| s.submission_id.clone())
        .collect();
    room.pick_winner(&host, &subs[1]).unwrap();
    room.pick_winner(&host, &subs[0]).unwrap();
    room.confirm_results(&host).unwrap();
    assert_eq!(room.scores[&pid("p2")], 10);
    assert_eq!(room.scores[&pid("p1")], 5);

    // Players never see the configured answer; the host does.
    let for_player = room.snapshot_for(Some(&pid("p1")));
    assert_eq!(for_player.questions[0].correct_answer, "");
    let for_host = room.snapshot_for(Some(&host));
    assert_eq!(for_host.questions[0].correct_answer, "(judged)");
}
