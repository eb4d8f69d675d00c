use landlord_core::game::snapshot::{SeatSnapshot, TableSnapshot};
use landlord_core::model::card::{Card, parse_cards};
use landlord_core::model::seat::{Role, Seat};
use landlord_core::model::table::{BidChoice, Phase};
use landlord_server::clock::ManualClock;
use landlord_server::config::ServerConfig;
use landlord_server::{Action, ActionEnvelope, Engine, ErrorKind, GameEvent, RoomId};
use std::collections::HashSet;

fn cards(list: &str) -> Vec<Card> {
    parse_cards(list).expect("valid card list")
}

fn engine_with(bots: [bool; 3]) -> (Engine, ManualClock, RoomId) {
    let clock = ManualClock::new(0);
    let mut engine = Engine::new(ServerConfig::default(), clock.clone()).with_seed(9);
    let room = RoomId::new("table-1");
    engine.create_room(room.clone(), 2024).expect("create room");
    for seat in Seat::LOOP {
        let name = if bots[seat.index()] { "bot" } else { "human" };
        engine
            .seat_player(&room, seat, format!("{name}-{}", seat.index()), bots[seat.index()])
            .expect("seat player");
    }
    (engine, clock, room)
}

fn seat_entry(seat: Seat, hand: &str, landlord: Seat) -> SeatSnapshot {
    let hand = cards(hand);
    SeatSnapshot {
        seat,
        hand_count: hand.len(),
        hand,
        role: Some(if seat == landlord {
            Role::Landlord
        } else {
            Role::Farmer
        }),
        online: true,
        is_bot: false,
    }
}

fn playing(hands: [&str; 3], landlord: Seat) -> TableSnapshot {
    TableSnapshot {
        phase: Phase::Playing,
        current_seat: landlord,
        last_pattern: None,
        pass_streak: 0,
        is_new_round: true,
        landlord_seat: Some(landlord),
        bottom_cards: Vec::new(),
        per_seat: Seat::LOOP
            .iter()
            .map(|&seat| seat_entry(seat, hands[seat.index()], landlord))
            .collect(),
        saved_at: 0,
        version: 0,
        first_bidder: Some(landlord),
        bids: Vec::new(),
        play_history: Vec::new(),
    }
}

fn act(engine: &mut Engine, room: &RoomId, seat: Seat, action: Action) -> Vec<GameEvent> {
    engine.handle(&ActionEnvelope::new(room.clone(), seat, action))
}

fn play(engine: &mut Engine, room: &RoomId, seat: Seat, list: &str) -> Vec<GameEvent> {
    act(engine, room, seat, Action::Play(cards(list)))
}

fn rejection(events: &[GameEvent]) -> Option<ErrorKind> {
    match events {
        [GameEvent::Rejected { kind, .. }] => Some(*kind),
        _ => None,
    }
}

fn dealt_cards(engine: &Engine, room: &RoomId) -> Vec<Vec<Card>> {
    let table = engine.table(room).expect("room");
    let mut dealt: Vec<Vec<Card>> = Seat::LOOP
        .iter()
        .map(|&seat| table.hand(seat).cards().to_vec())
        .collect();
    dealt.push(table.bottom_cards().to_vec());
    dealt
}

#[test]
fn all_declines_redeal_a_fresh_deck() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    let before = dealt_cards(&engine, &room);

    let mut last = Vec::new();
    for _ in 0..3 {
        let seat = engine.table(&room).unwrap().current_seat();
        last = act(&mut engine, &room, seat, Action::Bid(BidChoice::Decline));
        assert!(rejection(&last).is_none(), "decline rejected: {last:?}");
    }
    assert!(
        last.iter()
            .any(|event| matches!(event, GameEvent::Redealt { redeals: 1, .. }))
    );

    let table = engine.table(&room).unwrap();
    assert_eq!(table.phase(), Phase::Bidding);
    assert!(table.bids().is_empty());
    assert_eq!(table.redeals(), 1);

    let after = dealt_cards(&engine, &room);
    assert_ne!(before, after);
    let sizes: Vec<usize> = after.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![17, 17, 17, 3]);
    let distinct: HashSet<Card> = after.into_iter().flatten().collect();
    assert_eq!(distinct.len(), 54);
}

#[test]
fn stale_bot_task_is_discarded_after_the_human_acts() {
    let (mut engine, clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    let seat = engine.table(&room).unwrap().current_seat();

    engine.set_online(&room, seat, false).expect("go offline");
    assert_eq!(engine.pending_tasks(), 1);

    // The absent player acts before the takeover fires.
    let events = act(&mut engine, &room, seat, Action::Bid(BidChoice::Claim));
    assert!(rejection(&events).is_none());
    let after_human = engine.table(&room).unwrap().clone();

    clock.advance(10_000);
    assert!(engine.tick().is_empty());
    assert_eq!(engine.table(&room).unwrap(), &after_human);
    assert_eq!(engine.pending_tasks(), 0);
}

#[test]
fn returning_player_cancels_the_takeover() {
    let (mut engine, clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    let seat = engine.table(&room).unwrap().current_seat();
    engine.set_online(&room, seat, false).expect("go offline");

    let view = engine.reconnect(&room, seat).expect("reconnect");
    assert!(view.is_your_turn);
    let version = engine.table(&room).unwrap().version();

    clock.advance(10_000);
    assert!(engine.tick().is_empty());
    assert_eq!(engine.table(&room).unwrap().version(), version);
    assert_eq!(engine.table(&room).unwrap().current_seat(), seat);
}

#[test]
fn offline_seat_is_played_by_the_bot() {
    let (mut engine, clock, room) = engine_with([false; 3]);
    engine
        .restore_room(
            &room,
            &playing(["3S 3H 5D 9C", "4S 4H 6D 8C", "7S 7H JD QC"], Seat::First),
        )
        .expect("restore");
    engine.set_online(&room, Seat::First, false).expect("offline");

    clock.advance(5_000);
    let events = engine.tick();
    assert!(
        events.iter().any(|e| e.room_id == room
            && matches!(e.event, GameEvent::CardsPlayed { seat: Seat::First, .. })),
        "expected a takeover play, got {events:?}"
    );
}

#[test]
fn rejected_actions_leave_the_room_untouched() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine
        .restore_room(
            &room,
            &playing(["3S 3H 5D 9C", "4S 4H 6D 8C", "7S 7H JD QC"], Seat::First),
        )
        .expect("restore");
    let table = engine.table(&room).unwrap().clone();
    let stored = engine.snapshot(&room).cloned();

    let attempts = [
        (Seat::Second, Action::Play(cards("4S")), ErrorKind::OutOfTurn),
        (Seat::First, Action::Pass, ErrorKind::MustPlayOnLead),
        (Seat::First, Action::Play(cards("4S")), ErrorKind::CardsNotOwned),
        (Seat::First, Action::Play(cards("3S 5D")), ErrorKind::InvalidPattern),
        (
            Seat::First,
            Action::Bid(BidChoice::Claim),
            ErrorKind::BiddingAlreadyResolved,
        ),
    ];
    for (seat, action, expected) in attempts {
        let events = act(&mut engine, &room, seat, action);
        assert_eq!(rejection(&events), Some(expected));
        assert_eq!(engine.table(&room).unwrap(), &table);
        assert_eq!(engine.snapshot(&room).cloned(), stored);
    }

    assert!(rejection(&play(&mut engine, &room, Seat::First, "3S 3H")).is_none());
    let table = engine.table(&room).unwrap().clone();
    let events = play(&mut engine, &room, Seat::Second, "6D");
    assert_eq!(rejection(&events), Some(ErrorKind::IllegalBeat));
    assert_eq!(engine.table(&room).unwrap(), &table);
}

#[test]
fn two_passes_hand_the_lead_back() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine
        .restore_room(
            &room,
            &playing(["3S 3H 5D 9C", "4S 4H 6D 8C", "7S 7H JD QC"], Seat::First),
        )
        .expect("restore");
    play(&mut engine, &room, Seat::First, "3S 3H");
    let events = play(&mut engine, &room, Seat::Second, "4S 4H");
    assert!(matches!(
        events.as_slice(),
        [
            GameEvent::CardsPlayed {
                seat: Seat::Second,
                remaining_count: 2,
                ..
            },
            GameEvent::TurnChanged {
                next_seat: Seat::Third,
                is_lead: false,
                last_pattern: Some(_),
            },
        ]
    ));
    act(&mut engine, &room, Seat::Third, Action::Pass);
    let events = act(&mut engine, &room, Seat::First, Action::Pass);
    assert_eq!(
        events,
        vec![
            GameEvent::Passed { seat: Seat::First },
            GameEvent::TurnChanged {
                next_seat: Seat::Second,
                is_lead: true,
                last_pattern: None,
            },
        ]
    );
}

#[test]
fn spring_win_is_settled_and_recorded() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine
        .restore_room(&room, &playing(["3S 3H", "4S 4H 6D", "7S 7H 8D"], Seat::First))
        .expect("restore");

    let events = play(&mut engine, &room, Seat::First, "3S 3H");
    let Some(GameEvent::GameFinished {
        winner_seat,
        score_breakdown,
    }) = events.last()
    else {
        panic!("expected game_finished, got {events:?}");
    };
    assert_eq!(*winner_seat, Seat::First);
    assert!(score_breakdown.settlement.multiplier.spring);
    assert_eq!(score_breakdown.settlement.multiplier.total, 16);
    assert_eq!(score_breakdown.settlement.deltas, [32, -16, -16]);
    assert_eq!(score_breakdown.balances, [1032, 984, 984]);
    assert_eq!(engine.ledger().balance("human-0"), Some(1032));

    let records = engine.take_finished();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].winner, Seat::First);
    assert_eq!(records[0].moves, 1);
    assert!(engine.take_finished().is_empty());
    assert_eq!(engine.table(&room).unwrap().phase(), Phase::Finished);
}

#[test]
fn reset_clears_the_snapshot_and_allows_a_new_game() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    let err = engine.reset_room(&room).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GameInProgress);

    engine
        .restore_room(&room, &playing(["3S 3H", "4S 4H 6D", "7S 7H 8D"], Seat::First))
        .expect("restore");
    play(&mut engine, &room, Seat::First, "3S 3H");
    assert!(engine.snapshot(&room).is_some());

    engine.reset_room(&room).expect("reset");
    assert!(engine.snapshot(&room).is_none());
    let table = engine.table(&room).unwrap();
    assert_eq!(table.phase(), Phase::Waiting);
    assert!(table.play_history().is_empty());
    assert!(table.landlord().is_none());

    let events = engine.start_game(&room).expect("restart");
    assert!(matches!(events[0], GameEvent::GameStarted { .. }));
}

#[test]
fn corrupt_snapshot_keeps_the_last_good_table() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    let table = engine.table(&room).unwrap().clone();

    let corrupt = playing(["3S 3H", "3S 4H 6D", "7S 7H 8D"], Seat::First);
    let err = engine.restore_room(&room, &corrupt).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSnapshot);
    assert_eq!(engine.table(&room).unwrap(), &table);
}

#[test]
fn reconnect_shows_only_the_viewers_hand() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine.start_game(&room).expect("start");
    engine.set_online(&room, Seat::Second, false).expect("offline");

    let view = engine.reconnect(&room, Seat::Second).expect("view");
    assert_eq!(view.viewer, Seat::Second);
    assert_eq!(
        view.hand,
        engine.table(&room).unwrap().hand(Seat::Second).cards()
    );
    assert!(view.bottom_cards.is_empty());
    assert!(view.seats.iter().all(|seat| seat.hand_count == 17));
    assert!(view.seats.iter().all(|seat| seat.online));
    let stored = engine.snapshot(&room).expect("stored");
    assert!(stored.seat(Seat::Second).is_some_and(|entry| entry.online));
}

#[test]
fn hint_requests_do_not_mutate() {
    let (mut engine, _clock, room) = engine_with([false; 3]);
    engine
        .restore_room(
            &room,
            &playing(["3S 3H 5D 9C", "4S 4H 6D 8C", "7S 7H JD QC"], Seat::First),
        )
        .expect("restore");
    let table = engine.table(&room).unwrap().clone();

    let events = act(&mut engine, &room, Seat::First, Action::RequestHint);
    let [GameEvent::Hint { seat, cards }] = events.as_slice() else {
        panic!("expected a hint, got {events:?}");
    };
    assert_eq!(*seat, Seat::First);
    assert!(!cards.is_empty());
    assert_eq!(engine.table(&room).unwrap(), &table);

    let events = act(&mut engine, &room, Seat::Third, Action::RequestHint);
    assert_eq!(rejection(&events), Some(ErrorKind::OutOfTurn));
}

#[test]
fn bot_table_plays_a_full_game() {
    let (mut engine, clock, room) = engine_with([true; 3]);
    engine.start_game(&room).expect("start");

    let mut finished = None;
    for _ in 0..2_000 {
        let Some(due) = engine.next_due() else { break };
        clock.set(due);
        for room_event in engine.tick() {
            assert!(
                !matches!(room_event.event, GameEvent::Rejected { .. }),
                "bot move rejected: {room_event:?}"
            );
            if let GameEvent::GameFinished {
                score_breakdown, ..
            } = room_event.event
            {
                finished = Some(score_breakdown);
            }
        }
        if finished.is_some() {
            break;
        }
    }

    let breakdown = finished.expect("game should finish");
    assert_eq!(breakdown.settlement.deltas.iter().sum::<i64>(), 0);
    assert_eq!(engine.table(&room).unwrap().phase(), Phase::Finished);
    assert_eq!(engine.pending_tasks(), 0);
}

#[test]
fn evicted_room_is_gone() {
    let (mut engine, clock, room) = engine_with([true; 3]);
    engine.start_game(&room).expect("start");
    assert_eq!(engine.pending_tasks(), 1);

    engine.evict_room(&room).expect("evict");
    assert_eq!(engine.pending_tasks(), 0);
    assert!(engine.snapshot(&room).is_none());
    clock.advance(10_000);
    assert!(engine.tick().is_empty());

    let events = act(&mut engine, &room, Seat::First, Action::Pass);
    assert_eq!(rejection(&events), Some(ErrorKind::RoomNotFound));
}
