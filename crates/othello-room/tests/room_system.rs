//! Integration tests for the room coordinator.

use othello_engine::{Color, MoveError, Position, Turn, Winner};
use othello_protocol::{ParticipantId, RoomId, RoomStatus};
use othello_room::{ErrorKind, LeaveOutcome, RoomCoordinator, RoomError, Seat};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> ParticipantId {
    ParticipantId(id)
}

fn rid(id: &str) -> RoomId {
    RoomId::from(id)
}

/// Room "r1" with 1 as black and 2 as white.
fn two_player_room() -> RoomCoordinator {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    rooms.join_room(&rid("r1"), pid(1), Some(Color::Black)).unwrap();
    rooms.join_room(&rid("r1"), pid(2), Some(Color::White)).unwrap();
    rooms
}

// =========================================================================
// Creation
// =========================================================================

#[test]
fn test_create_room_is_empty() {
    let mut rooms = RoomCoordinator::new();
    let room = rooms.create_room(rid("r1")).unwrap();

    assert_eq!(room.id, rid("r1"));
    assert!(room.players.is_empty());
    assert!(room.spectators.is_empty());
    assert!(room.chat.is_empty());
    assert_eq!(room.status, RoomStatus::WaitingForPlayers);
    assert_eq!(room.game_state.black_score, 2);
    assert_eq!(room.game_state.white_score, 2);
    assert_eq!(rooms.room_count(), 1);
}

#[test]
fn test_create_room_duplicate_id() {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    let err = rooms.create_room(rid("r1")).unwrap_err();
    assert!(matches!(err, RoomError::RoomExists(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_create_room_rejects_malformed_id() {
    let mut rooms = RoomCoordinator::new();
    let err = rooms.create_room(rid("no spaces")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(rooms.room_count(), 0);
}

#[test]
fn test_open_room_seats_creator_as_black() {
    let mut rooms = RoomCoordinator::new();
    let mut rng = StdRng::seed_from_u64(42);
    let room = rooms.open_room(pid(1), &mut rng).unwrap();

    assert!(room.id.as_str().starts_with("room-"));
    assert_eq!(room.players.black, Some(pid(1)));
    assert_eq!(room.players.white, None);
    assert_eq!(rooms.room_of(&pid(1)), Some(&room.id));
}

#[test]
fn test_open_room_while_elsewhere_leaves_no_room_behind() {
    let mut rooms = RoomCoordinator::new();
    let mut rng = StdRng::seed_from_u64(42);
    rooms.open_room(pid(1), &mut rng).unwrap();

    let err = rooms.open_room(pid(1), &mut rng).unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInAnotherRoom { .. }));
    assert_eq!(rooms.room_count(), 1);
}

// =========================================================================
// Joining
// =========================================================================

#[test]
fn test_join_fills_black_then_white_then_spectators() {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    for id in 1..=4 {
        rooms.join_room(&rid("r1"), pid(id), None).unwrap();
    }

    let room = rooms.get_room(&rid("r1")).unwrap();
    assert_eq!(room.players.black, Some(pid(1)));
    assert_eq!(room.players.white, Some(pid(2)));
    assert_eq!(room.spectators, vec![pid(3), pid(4)]);
    assert_eq!(room.status, RoomStatus::InProgress);
    assert_eq!(
        rooms.members(&rid("r1")).unwrap(),
        vec![pid(1), pid(2), pid(3), pid(4)]
    );
}

#[test]
fn test_join_with_preference_skips_black() {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    let room = rooms.join_room(&rid("r1"), pid(1), Some(Color::White)).unwrap();
    assert_eq!(room.players.white, Some(pid(1)));
    assert_eq!(room.players.black, None);

    // No preference now lands on the free black seat.
    let room = rooms.join_room(&rid("r1"), pid(2), None).unwrap();
    assert_eq!(room.players.black, Some(pid(2)));
}

#[test]
fn test_join_preferred_color_taken() {
    let mut rooms = two_player_room();
    let err = rooms
        .join_room(&rid("r1"), pid(3), Some(Color::Black))
        .unwrap_err();
    assert!(matches!(err, RoomError::ColorTaken { color: Color::Black, .. }));
    assert_eq!(err.kind().code(), 409);
    // Nothing recorded for the refused participant.
    assert_eq!(rooms.room_of(&pid(3)), None);
    assert!(rooms.get_room(&rid("r1")).unwrap().spectators.is_empty());
}

#[test]
fn test_rejoin_same_room_is_idempotent() {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    rooms.join_room(&rid("r1"), pid(1), None).unwrap();
    rooms.join_room(&rid("r1"), pid(2), None).unwrap();
    let first = rooms.join_room(&rid("r1"), pid(3), None).unwrap();

    // Asking for a color on rejoin changes nothing either.
    let again = rooms.join_room(&rid("r1"), pid(3), None).unwrap();
    assert_eq!(first, again);
    let again = rooms
        .join_room(&rid("r1"), pid(1), Some(Color::White))
        .unwrap();
    assert_eq!(again.players.black, Some(pid(1)));
    assert_eq!(again.spectators, vec![pid(3)]);
}

#[test]
fn test_join_second_room_is_refused() {
    let mut rooms = RoomCoordinator::new();
    rooms.create_room(rid("r1")).unwrap();
    rooms.create_room(rid("r2")).unwrap();
    rooms.join_room(&rid("r1"), pid(1), None).unwrap();

    let err = rooms.join_room(&rid("r2"), pid(1), None).unwrap_err();
    match err {
        RoomError::AlreadyInAnotherRoom {
            participant_id,
            current,
        } => {
            assert_eq!(participant_id, pid(1));
            assert_eq!(current, rid("r1"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(rooms.get_room(&rid("r2")).unwrap().players.is_empty());
}

#[test]
fn test_join_unknown_room() {
    let mut rooms = RoomCoordinator::new();
    let err = rooms.join_room(&rid("nope"), pid(1), None).unwrap_err();
    assert!(matches!(err, RoomError::RoomNotFound(_)));
    assert_eq!(err.kind().code(), 404);
    assert_eq!(rooms.room_of(&pid(1)), None);
}

// =========================================================================
// Leaving
// =========================================================================

#[test]
fn test_leave_frees_seat_and_index() {
    let mut rooms = two_player_room();
    assert_eq!(
        rooms.leave_room(&rid("r1"), pid(1)).unwrap(),
        LeaveOutcome::Left
    );
    assert_eq!(rooms.room_of(&pid(1)), None);
    assert_eq!(rooms.seat_of(&rid("r1"), pid(1)).unwrap(), None);

    let room = rooms.get_room(&rid("r1")).unwrap();
    assert_eq!(room.players.black, None);
    assert_eq!(room.status, RoomStatus::WaitingForPlayers);

    // Free to join somewhere else now.
    rooms.create_room(rid("r2")).unwrap();
    rooms.join_room(&rid("r2"), pid(1), None).unwrap();
}

#[test]
fn test_leave_unknown_participant_is_a_no_op() {
    let mut rooms = two_player_room();
    assert_eq!(
        rooms.leave_room(&rid("r1"), pid(99)).unwrap(),
        LeaveOutcome::NotPresent
    );
    assert_eq!(rooms.members(&rid("r1")).unwrap(), vec![pid(1), pid(2)]);
}

#[test]
fn test_last_leave_closes_room() {
    let mut rooms = two_player_room();
    rooms.join_room(&rid("r1"), pid(3), None).unwrap();

    assert_eq!(rooms.leave_room(&rid("r1"), pid(1)).unwrap(), LeaveOutcome::Left);
    assert_eq!(rooms.leave_room(&rid("r1"), pid(2)).unwrap(), LeaveOutcome::Left);
    // A lone spectator still keeps the room open.
    assert!(rooms.get_room(&rid("r1")).is_ok());
    assert_eq!(
        rooms.leave_room(&rid("r1"), pid(3)).unwrap(),
        LeaveOutcome::RoomClosed
    );

    let err = rooms.get_room(&rid("r1")).unwrap_err();
    assert!(matches!(err, RoomError::RoomNotFound(_)));
    assert_eq!(rooms.room_count(), 0);
}

#[test]
fn test_leave_all_on_disconnect() {
    let mut rooms = two_player_room();
    assert_eq!(
        rooms.leave_all(pid(2)),
        Some((rid("r1"), LeaveOutcome::Left))
    );
    assert_eq!(rooms.leave_all(pid(2)), None);
    assert_eq!(
        rooms.leave_all(pid(1)),
        Some((rid("r1"), LeaveOutcome::RoomClosed))
    );
    assert!(rooms.room_ids().is_empty());
}

// =========================================================================
// Moves
// =========================================================================

#[test]
fn test_opening_move_scenario() {
    let mut rooms = two_player_room();
    let outcome = rooms
        .make_move(&rid("r1"), pid(1), Position::new(2, 3))
        .unwrap();
    assert_eq!(outcome.flipped, vec![Position::new(3, 3)]);
    assert_eq!(outcome.turn, Turn::Next(Color::White));

    let state = rooms.get_room(&rid("r1")).unwrap().game_state;
    assert_eq!(state.board.get(Position::new(2, 3)), Some(Color::Black));
    assert_eq!(state.board.get(Position::new(3, 3)), Some(Color::Black));
    assert_eq!(state.black_score, 4);
    assert_eq!(state.white_score, 1);
    assert_eq!(state.current_player, Color::White);
    assert_eq!(state.last_move, Some(Position::new(2, 3)));
}

#[test]
fn test_spectator_cannot_move() {
    let mut rooms = two_player_room();
    rooms.join_room(&rid("r1"), pid(3), None).unwrap();
    let before = rooms.get_room(&rid("r1")).unwrap().game_state;

    let err = rooms
        .make_move(&rid("r1"), pid(3), Position::new(2, 3))
        .unwrap_err();
    assert!(matches!(err, RoomError::NotAPlayer { .. }));
    assert_eq!(err.kind(), ErrorKind::IllegalTurn);
    assert_eq!(rooms.get_room(&rid("r1")).unwrap().game_state, before);
}

#[test]
fn test_out_of_turn_move_is_refused() {
    let mut rooms = two_player_room();
    let before = rooms.get_room(&rid("r1")).unwrap().game_state;

    let err = rooms
        .make_move(&rid("r1"), pid(2), Position::new(2, 4))
        .unwrap_err();
    assert!(matches!(err, RoomError::NotYourTurn { expected: Color::Black }));
    assert_eq!(err.kind().code(), 403);
    assert_eq!(rooms.get_room(&rid("r1")).unwrap().game_state, before);
}

#[test]
fn test_illegal_square_is_refused() {
    let mut rooms = two_player_room();

    let err = rooms
        .make_move(&rid("r1"), pid(1), Position::new(0, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        RoomError::InvalidMove(MoveError::NoCapture(_))
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidMove);

    let err = rooms
        .make_move(&rid("r1"), pid(1), Position::new(3, 3))
        .unwrap_err();
    assert!(matches!(err, RoomError::InvalidMove(MoveError::Occupied(_))));
}

#[test]
fn test_move_in_unknown_room() {
    let mut rooms = RoomCoordinator::new();
    let err = rooms
        .make_move(&rid("nope"), pid(1), Position::new(2, 3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =========================================================================
// Forfeit, chat, reset
// =========================================================================

#[test]
fn test_forfeit_in_fresh_game() {
    let mut rooms = two_player_room();
    rooms.forfeit_game(&rid("r1"), pid(2)).unwrap();

    let room = rooms.get_room(&rid("r1")).unwrap();
    assert!(room.game_state.is_game_over);
    assert_eq!(room.game_state.winner, Some(Winner::Black));
    assert_eq!(room.status, RoomStatus::Finished);

    // No more moves once it's over.
    let err = rooms
        .make_move(&rid("r1"), pid(1), Position::new(2, 3))
        .unwrap_err();
    assert!(matches!(err, RoomError::InvalidMove(MoveError::GameOver)));
}

#[test]
fn test_spectator_cannot_forfeit() {
    let mut rooms = two_player_room();
    rooms.join_room(&rid("r1"), pid(3), None).unwrap();
    let err = rooms.forfeit_game(&rid("r1"), pid(3)).unwrap_err();
    assert!(matches!(err, RoomError::NotAPlayer { .. }));
    assert!(!rooms.get_room(&rid("r1")).unwrap().game_state.is_game_over);
}

#[test]
fn test_chat_is_trimmed_and_open_to_anyone() {
    let mut rooms = two_player_room();
    let entry = rooms
        .add_chat_message(&rid("r1"), pid(1), "  good luck  ")
        .unwrap();
    assert_eq!(entry.message, "good luck");
    assert!(entry.timestamp > 0);

    // Not a member of the room; still accepted.
    rooms.add_chat_message(&rid("r1"), pid(50), "hello").unwrap();

    let chat = rooms.get_room(&rid("r1")).unwrap().chat;
    assert_eq!(chat.len(), 2);
    assert_eq!(chat[0].participant_id, pid(1));
    assert_eq!(chat[1].message, "hello");
}

#[test]
fn test_chat_validation() {
    let mut rooms = two_player_room();
    let err = rooms.add_chat_message(&rid("r1"), pid(1), "   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = rooms
        .add_chat_message(&rid("r1"), pid(1), &"x".repeat(501))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(rooms.get_room(&rid("r1")).unwrap().chat.is_empty());
}

#[test]
fn test_reset_keeps_roster_and_chat() {
    let mut rooms = two_player_room();
    rooms.join_room(&rid("r1"), pid(3), None).unwrap();
    rooms
        .make_move(&rid("r1"), pid(1), Position::new(2, 3))
        .unwrap();
    rooms.add_chat_message(&rid("r1"), pid(3), "gg").unwrap();
    rooms.forfeit_game(&rid("r1"), pid(1)).unwrap();

    rooms.reset_game(&rid("r1")).unwrap();

    let room = rooms.get_room(&rid("r1")).unwrap();
    assert!(!room.game_state.is_game_over);
    assert_eq!(room.game_state.current_player, Color::Black);
    assert_eq!(room.game_state.black_score, 2);
    assert_eq!(room.game_state.white_score, 2);
    assert_eq!(room.game_state.last_move, None);
    assert_eq!(room.players.black, Some(pid(1)));
    assert_eq!(room.players.white, Some(pid(2)));
    assert_eq!(room.spectators, vec![pid(3)]);
    assert_eq!(room.chat.len(), 1);
    assert_eq!(
        rooms.seat_of(&rid("r1"), pid(2)).unwrap(),
        Some(Seat::Player(Color::White))
    );
}

#[test]
fn test_list_rooms_sorted_by_id() {
    let mut rooms = RoomCoordinator::new();
    for id in ["c", "a", "b"] {
        rooms.create_room(rid(id)).unwrap();
    }
    let ids: Vec<_> = rooms.list_rooms().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![rid("a"), rid("b"), rid("c")]);
}
