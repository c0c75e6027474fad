// Whole-session flows across a host and several clients.

use super::test_support::{Room, frontend_of};
use super::types::LocalIntent;
use crate::domain::{ContactKind, RoundPhase, Vec3};

fn lobby_with_characters(clients: &[&str]) -> Room {
    let mut room = Room::new("h", clients);
    for (i, id) in room.ids().iter().enumerate() {
        room.intent(id, LocalIntent::SelectCharacter(format!("animal-{i}")));
    }
    room
}

/// Every participant picks its own slot and places once; ends in the countdown.
fn build_round(room: &mut Room) {
    let ids = room.ids();
    for (i, id) in ids.iter().enumerate() {
        room.intent(id, LocalIntent::Pick(i));
    }
    for (i, id) in ids.iter().enumerate() {
        room.intent(id, LocalIntent::BeginPlacement);
        let round = room.status(id).round as f32;
        room.intent(id, LocalIntent::Place(Vec3::new(i as f32 * 4.0, round, 0.0)));
    }
}

fn run_to_scores(room: &mut Room, outcomes: &[(&str, ContactKind)]) {
    room.tick_all(1.0);
    room.tick_all(1.0);
    room.tick_all(1.1);
    for (id, kind) in outcomes {
        room.intent(id, LocalIntent::Contact(*kind));
    }
}

fn phases(room: &Room) -> Vec<RoundPhase> {
    room.ids().iter().map(|id| room.status(id).phase).collect()
}

#[test]
fn when_clients_join_then_every_directory_matches_the_host() {
    let room = Room::new("h", &["a", "b", "c"]);

    let host = room.status("h").participants;
    assert_eq!(host.len(), 4);
    assert_eq!(host.iter().filter(|p| p.is_host).count(), 1);
    for id in ["a", "b", "c"] {
        assert_eq!(room.status(id).participants, host);
        assert_eq!(room.status(id).phase, RoundPhase::Lobby);
    }
}

#[test]
fn when_two_clients_want_one_character_then_the_first_request_wins_everywhere() {
    let mut room = Room::new("h", &["a", "b"]);
    room.queue("a", LocalIntent::SelectCharacter("chicken".to_string()));
    room.queue("b", LocalIntent::SelectCharacter("chicken".to_string()));
    room.pump();

    for id in ["h", "a", "b"] {
        let participants = room.status(id).participants;
        let owners: Vec<&str> = participants
            .iter()
            .filter(|p| p.character == "chicken")
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(owners, ["a"]);
    }
}

#[test]
fn when_host_starts_then_every_peer_enters_item_pick() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);

    assert_eq!(phases(&room), [RoundPhase::ItemPick; 3]);
}

#[test]
fn when_two_clients_pick_the_same_slot_concurrently_then_exactly_one_builds() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);

    room.queue("a", LocalIntent::Pick(1));
    room.queue("b", LocalIntent::Pick(1));
    room.pump();

    assert_eq!(room.status("a").phase, RoundPhase::BuildView);
    assert_eq!(room.status("b").phase, RoundPhase::ItemPick);
    for id in ["h", "a", "b"] {
        assert_eq!(frontend_of(room.peer(id)).hidden_slots, [1]);
    }

    room.intent("b", LocalIntent::Pick(2));
    assert_eq!(room.status("b").phase, RoundPhase::BuildView);
}

#[test]
fn when_everyone_places_then_all_peers_count_down_with_the_same_level() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);

    build_round(&mut room);

    assert_eq!(phases(&room), [RoundPhase::Countdown; 3]);
    let host_level = frontend_of(room.peer("h")).spawned.clone();
    assert_eq!(host_level.len(), 3);
    for id in ["a", "b"] {
        let level = &frontend_of(room.peer(id)).spawned;
        assert_eq!(level.len(), 3);
        assert!(host_level.iter().all(|item| level.contains(item)));
    }
}

#[test]
fn when_some_have_not_placed_then_no_peer_leaves_the_build_phase() {
    let mut room = lobby_with_characters(&["a"]);
    room.intent("h", LocalIntent::StartSession);
    room.intent("h", LocalIntent::Pick(0));
    room.intent("a", LocalIntent::Pick(1));
    room.intent("h", LocalIntent::BeginPlacement);
    room.intent("h", LocalIntent::Place(Vec3::new(0.0, 0.0, 0.0)));

    assert_eq!(room.status("h").phase, RoundPhase::BuildPlace);
    assert_eq!(room.status("a").phase, RoundPhase::BuildView);
    assert_eq!(
        frontend_of(room.peer("h")).last_message(),
        Some("Waiting for other players...")
    );
}

#[test]
fn when_run_ends_then_every_peer_shows_the_host_scores() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);
    build_round(&mut room);

    room.intent("a", LocalIntent::Contact(ContactKind::Collectible));
    assert_eq!(room.status("a").phase, RoundPhase::Countdown);
    run_to_scores(
        &mut room,
        &[
            ("a", ContactKind::Collectible),
            ("a", ContactKind::Goal),
            ("b", ContactKind::Hazard),
            ("h", ContactKind::Goal),
        ],
    );

    assert_eq!(phases(&room), [RoundPhase::Score; 3]);
    let host_scores = frontend_of(room.peer("h")).scores.clone();
    assert_eq!(host_scores.len(), 1);
    let totals: Vec<(&str, u32)> = host_scores[0]
        .iter()
        .map(|e| (e.id.as_str(), e.current))
        .collect();
    assert_eq!(totals, [("h", 10), ("a", 12), ("b", 0)]);
    for id in ["a", "b"] {
        assert_eq!(frontend_of(room.peer(id)).scores, host_scores);
    }
}

#[test]
fn when_actors_stream_poses_then_nobody_applies_its_own() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);
    build_round(&mut room);

    room.tick_all(0.5);

    for id in ["h", "a", "b"] {
        let applied = &frontend_of(room.peer(id)).snapshots;
        assert!(!applied.is_empty());
        assert!(applied.iter().all(|actor| actor != id));
    }
}

#[test]
fn when_peer_joins_mid_round_then_it_waits_and_plays_the_next_round() {
    let mut room = lobby_with_characters(&["a"]);
    room.intent("h", LocalIntent::StartSession);
    room.intent("h", LocalIntent::Pick(0));
    room.intent("h", LocalIntent::BeginPlacement);
    room.intent("h", LocalIntent::Place(Vec3::new(0.0, 0.0, 0.0)));

    room.connect("c");

    assert_eq!(room.status("c").phase, RoundPhase::Lobby);
    assert_eq!(frontend_of(room.peer("c")).spawned.len(), 1);
    room.intent("a", LocalIntent::Pick(1));
    room.intent("a", LocalIntent::BeginPlacement);
    room.intent("a", LocalIntent::Place(Vec3::new(8.0, 0.0, 0.0)));
    assert_eq!(room.status("h").phase, RoundPhase::Countdown);
    assert_eq!(frontend_of(room.peer("c")).spawned.len(), 2);

    run_to_scores(&mut room, &[("h", ContactKind::Hazard), ("a", ContactKind::Hazard)]);
    assert_eq!(room.status("h").phase, RoundPhase::Score);

    room.intent("h", LocalIntent::ScoreRevealFinished);
    assert_eq!(phases(&room), [RoundPhase::ItemPick; 3]);
    assert!(room.status("h").participants.iter().all(|p| !p.spectating));
}

#[test]
fn when_client_leaves_mid_build_then_the_rest_continue() {
    let mut room = lobby_with_characters(&["a", "b"]);
    room.intent("h", LocalIntent::StartSession);
    room.intent("h", LocalIntent::Pick(0));
    room.intent("a", LocalIntent::Pick(1));
    room.intent("h", LocalIntent::BeginPlacement);
    room.intent("h", LocalIntent::Place(Vec3::new(0.0, 0.0, 0.0)));
    room.intent("a", LocalIntent::BeginPlacement);
    room.intent("a", LocalIntent::Place(Vec3::new(6.0, 0.0, 0.0)));
    assert_eq!(room.status("h").phase, RoundPhase::BuildPlace);

    room.disconnect("b");

    assert_eq!(phases(&room), [RoundPhase::Countdown; 2]);
    assert_eq!(room.status("a").participants.len(), 2);
}

/// Five rounds where the host always reaches the goal; ends on the win screen.
fn play_to_game_over(room: &mut Room) {
    room.intent("h", LocalIntent::StartSession);
    for round in 1..=5 {
        if round > 1 {
            room.intent("h", LocalIntent::ScoreRevealFinished);
        }
        build_round(room);
        run_to_scores(room, &[("h", ContactKind::Goal), ("a", ContactKind::Hazard)]);
        assert_eq!(room.status("a").phase, RoundPhase::Score);
    }
    room.intent("h", LocalIntent::ScoreRevealFinished);
}

#[test]
fn when_someone_reaches_the_goal_score_then_game_over_and_back_to_lobby() {
    let mut room = lobby_with_characters(&["a"]);
    play_to_game_over(&mut room);

    assert_eq!(phases(&room), [RoundPhase::GameOver; 2]);
    let winner = frontend_of(room.peer("a")).winner.clone();
    assert_eq!(winner.map(|w| (w.id, w.current)), Some(("h".to_string(), 50)));

    room.intent("h", LocalIntent::DismissWinScreen);
    room.intent("a", LocalIntent::DismissWinScreen);
    assert_eq!(phases(&room), [RoundPhase::Lobby; 2]);
    for id in ["h", "a"] {
        assert!(room.status(id).participants.iter().all(|p| p.total_score == 0));
        assert!(frontend_of(room.peer(id)).spawned.is_empty());
    }
}

#[test]
fn when_host_restarts_before_client_dismissed_then_client_starts_from_an_empty_level() {
    let mut room = lobby_with_characters(&["a"]);
    play_to_game_over(&mut room);
    assert!(!frontend_of(room.peer("a")).spawned.is_empty());

    room.intent("h", LocalIntent::DismissWinScreen);
    assert_eq!(room.status("a").phase, RoundPhase::GameOver);
    room.intent("h", LocalIntent::StartSession);

    assert_eq!(phases(&room), [RoundPhase::ItemPick; 2]);
    assert!(frontend_of(room.peer("a")).spawned.is_empty());
    assert_eq!(room.status("a").participants, room.status("h").participants);
    assert!(room.status("a").participants.iter().all(|p| p.total_score == 0));

    build_round(&mut room);
    run_to_scores(&mut room, &[("h", ContactKind::Goal), ("a", ContactKind::Hazard)]);
    assert_eq!(phases(&room), [RoundPhase::Score; 2]);
    assert_eq!(
        frontend_of(room.peer("a")).spawned.len(),
        frontend_of(room.peer("h")).spawned.len()
    );
}
