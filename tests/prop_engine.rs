//! Property-based tests for the engine.
//!
//! These drive random action attempts through a game and check the
//! properties every state must keep: replay determinism, snapshot round
//! trips, copy isolation and non-mutation on rejection.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use citadel::clock::FixedClock;
use citadel::game::{check_invariants, kinds};
use citadel::replay::{to_full_state, verify};
use citadel::{
    ActionKind, Coord, Engine, GameState, InitialConfig, LogEntry, PieceCatalog, PieceId,
    PlayerId, SetupParams, Target,
};

/// One random move attempt.
#[derive(Debug, Clone)]
enum Attempt {
    /// Try an action; `piece` indexes the state's pieces in id order.
    Act {
        piece: usize,
        action: usize,
        from: (i32, i32),
        to: (i32, i32),
    },
    /// End the current turn.
    EndTurn,
}

fn attempt_strategy() -> impl Strategy<Value = Attempt> {
    prop_oneof![
        8 => (0usize..64, 0usize..ActionKind::ALL.len(), (-1i32..5, -1i32..5), (-1i32..5, -1i32..5))
            .prop_map(|(piece, action, from, to)| Attempt::Act { piece, action, from, to }),
        1 => Just(Attempt::EndTurn),
    ]
}

/// A 4x4 island with one citadel per player, in play.
fn island() -> Engine {
    let initial = InitialConfig {
        players: vec![PlayerId::from("alice"), PlayerId::from("bob")],
        setup: SetupParams {
            actions_per_turn: 3,
            ..SetupParams::default()
        },
        pool: BTreeMap::from([(kinds::LAND.to_string(), 20), (kinds::WATER.to_string(), 2)]),
        ..InitialConfig::default()
    };
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut engine = Engine::new(initial, Arc::new(PieceCatalog::standard()))
        .unwrap()
        .with_clock(Arc::new(FixedClock(stamp)));
    engine.open_setup().unwrap();

    // Three placements per turn: alternate seats while laying the grid
    let mut n = 0;
    for y in 0..4 {
        for x in 0..4 {
            if n > 0 && n % 3 == 0 {
                engine.end_turn().unwrap();
            }
            engine
                .place_piece(&PieceId::new(format!("pool:land:{n}")), Coord::new(x, y))
                .unwrap();
            n += 1;
        }
    }
    engine.end_turn().unwrap();
    // Put the turn back on alice if the grid left it with bob
    if engine.state().unwrap().current_player() != Some(&PlayerId::from("alice")) {
        engine.end_turn().unwrap();
    }
    engine
        .place_piece(&PieceId::from("alice:citadel:0"), Coord::new(0, 0))
        .unwrap();
    engine.end_turn().unwrap();
    engine
        .place_piece(&PieceId::from("bob:citadel:0"), Coord::new(3, 3))
        .unwrap();
    engine.end_turn().unwrap();
    engine.begin_play().unwrap();
    engine
}

/// End-of-turn entry closing the turn `entry` belongs to.
fn end_of_turn(entry: &LogEntry) -> LogEntry {
    LogEntry::end_turn(entry.player.clone(), entry.turn_number, entry.timestamp)
}

fn resolve(state: &GameState, attempt: &Attempt) -> Option<(PieceId, ActionKind, Target)> {
    let Attempt::Act { piece, action, from, to } = attempt else {
        return None;
    };
    let ids: Vec<PieceId> = state.pieces().map(|p| p.id.clone()).collect();
    let id = ids.get(piece % ids.len())?.clone();
    let action = ActionKind::ALL[*action];
    let to = Coord::new(to.0, to.1);
    let target = match action {
        ActionKind::ShiftTerrain => Target::Transfer {
            from: Coord::new(from.0, from.1),
            to,
        },
        _ => Target::At(to),
    };
    Some((id, action, target))
}

/// Apply attempts, ignoring rule violations; returns accepted count.
fn play(engine: &mut Engine, attempts: &[Attempt]) -> usize {
    let mut accepted = 0;
    for attempt in attempts {
        let result = match resolve(engine.state().unwrap(), attempt) {
            Some((piece, action, target)) => engine.execute_action(&piece, action, target),
            None => engine.end_turn(),
        };
        match result {
            Ok(_) => accepted += 1,
            Err(err) => assert!(err.is_rule_violation(), "unexpected failure: {err}"),
        }
    }
    accepted
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Adjacency is symmetric and never reflexive.
    #[test]
    fn prop_adjacency_symmetric(
        ax in -50i32..50, ay in -50i32..50,
        bx in -50i32..50, by in -50i32..50
    ) {
        let a = Coord::new(ax, ay);
        let b = Coord::new(bx, by);
        prop_assert_eq!(a.is_adjacent_to(b), b.is_adjacent_to(a));
        prop_assert_eq!(a.is_orthogonally_adjacent_to(b), b.is_orthogonally_adjacent_to(a));
        prop_assert!(!a.is_adjacent_to(a));
    }

    /// Coordinates survive their string form.
    #[test]
    fn prop_coord_key_roundtrip(x in any::<i32>(), y in any::<i32>()) {
        let coord = Coord::new(x, y);
        prop_assert_eq!(coord.to_string().parse::<Coord>().unwrap(), coord);
    }

    /// Replaying the same log twice gives identical, consistent states.
    #[test]
    fn prop_replay_deterministic(attempts in prop::collection::vec(attempt_strategy(), 1..40)) {
        let mut engine = island();
        play(&mut engine, &attempts);

        let catalog = PieceCatalog::standard();
        let report = verify(engine.persistent(), &catalog).unwrap();
        prop_assert!(report.is_ok(), "{:?}", report);

        let replayed = to_full_state(engine.persistent(), &catalog).unwrap();
        prop_assert_eq!(replayed.to_json().unwrap(), engine.state().unwrap().to_json().unwrap());
    }

    /// A snapshot reloads to the same state.
    #[test]
    fn prop_snapshot_roundtrip(attempts in prop::collection::vec(attempt_strategy(), 1..40)) {
        let mut engine = island();
        play(&mut engine, &attempts);

        let state = engine.state().unwrap();
        let json = state.to_json().unwrap();
        let loaded = GameState::from_json(&json, &PieceCatalog::standard()).unwrap();
        prop_assert_eq!(loaded.to_json().unwrap(), json);
        prop_assert!(check_invariants(&loaded).is_empty());
    }

    /// Rejected attempts leave the document and the state untouched.
    #[test]
    fn prop_rejection_mutates_nothing(attempts in prop::collection::vec(attempt_strategy(), 1..40)) {
        let mut engine = island();
        for attempt in &attempts {
            let Some((piece, action, target)) = resolve(engine.state().unwrap(), attempt) else {
                // Fails once the game is over, which is fine here
                let _ = engine.end_turn();
                continue;
            };
            let document = engine.persistent().clone();
            let state = engine.state().unwrap().to_json().unwrap();

            if engine.check_action(&piece, action, target).is_err() {
                prop_assert_eq!(engine.persistent(), &document);
                prop_assert_eq!(engine.state().unwrap().to_json().unwrap(), state.clone());
            }
            if engine.execute_action(&piece, action, target).is_err() {
                prop_assert_eq!(engine.persistent(), &document);
                prop_assert_eq!(engine.state().unwrap().to_json().unwrap(), state);
            }
        }
    }

    /// Changing a simulated copy never changes the state it came from.
    #[test]
    fn prop_simulation_isolated(attempts in prop::collection::vec(attempt_strategy(), 1..40)) {
        let mut engine = island();
        for attempt in &attempts {
            let Some((piece, action, target)) = resolve(engine.state().unwrap(), attempt) else {
                continue;
            };
            let Ok(entry) = engine.check_action(&piece, action, target) else {
                continue;
            };
            let live = engine.state().unwrap();
            let before = live.to_json().unwrap();
            let board_before = live.board().clone();

            let mut copy = live.simulate();
            copy.apply_entry(&entry).unwrap();
            let mut nested = copy.fork();
            nested.apply_entry(&end_of_turn(&entry)).unwrap();

            prop_assert_eq!(live.to_json().unwrap(), before);
            prop_assert_eq!(live.board(), &board_before);
            prop_assert_eq!(copy.log_len(), live.log_len() + 1);
        }
    }
}

