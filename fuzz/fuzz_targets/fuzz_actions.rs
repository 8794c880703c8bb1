#![no_main]

//! Random action fuzzer.
//!
//! Drives arbitrary action attempts through the engine:
//! 1. Lay a small island and seat two citadels
//! 2. Attempt actions with arbitrary pieces, kinds and targets
//! 3. Check structural invariants after every commit
//! 4. Replay the log and compare with the cached state
//!
//! Any invariant failure (as opposed to a rule violation) is a bug.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbitrary::Arbitrary;
use citadel::game::{check_invariants, kinds};
use citadel::replay::to_full_state;
use citadel::{
    ActionKind, Coord, Engine, InitialConfig, PieceCatalog, PieceId, PlayerId, SetupParams, Target,
};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated attempt.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzAttempt {
    /// Try an action.
    Act {
        piece: u8,
        action: u8,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    },
    /// End the current turn.
    EndTurn,
    /// Take back the last entry.
    Undo,
}

/// Structured input for the action fuzzer.
#[derive(Arbitrary, Debug)]
struct ActionInput {
    /// Island width and height (clamped to 2..=6).
    size: (u8, u8),
    /// Actions per turn (clamped to 1..=4).
    actions_per_turn: u8,
    /// Use the first-capture variant instead of the default.
    first_capture: bool,
    /// Attempts to make.
    attempts: Vec<FuzzAttempt>,
}

/// Mostly cells near the island, sometimes far away or at the `i32` edges.
fn axis(raw: i32) -> i32 {
    match raw.rem_euclid(16) {
        0 => raw,
        1 => i32::MAX,
        2 => i32::MIN,
        _ => raw % 8,
    }
}

fuzz_target!(|input: ActionInput| {
    let width = i32::from(input.size.0 % 5) + 2;
    let height = i32::from(input.size.1 % 5) + 2;
    let attempts: Vec<_> = input.attempts.into_iter().take(64).collect();

    let initial = InitialConfig {
        players: vec![PlayerId::from("alice"), PlayerId::from("bob")],
        variant: if input.first_capture { "first-capture" } else { "last-citadel" }.to_string(),
        setup: SetupParams {
            actions_per_turn: 64,
            ..SetupParams::default()
        },
        pool: BTreeMap::from([(kinds::LAND.to_string(), 40), (kinds::WATER.to_string(), 4)]),
        ..InitialConfig::default()
    };
    let Ok(mut engine) = Engine::new(initial, Arc::new(PieceCatalog::standard())) else {
        return;
    };

    // Setup: lay the island, one citadel in each far corner
    engine.open_setup().unwrap();
    let mut n = 0;
    for y in 0..height {
        for x in 0..width {
            engine
                .place_piece(&PieceId::new(format!("pool:land:{n}")), Coord::new(x, y))
                .unwrap();
            n += 1;
        }
    }
    engine
        .place_piece(&PieceId::from("alice:citadel:0"), Coord::new(0, 0))
        .unwrap();
    engine.end_turn().unwrap();
    engine
        .place_piece(&PieceId::from("bob:citadel:0"), Coord::new(width - 1, height - 1))
        .unwrap();
    engine.end_turn().unwrap();
    engine.begin_play().unwrap();

    let mut document = engine.persistent().clone();
    document.initial.setup.actions_per_turn = u32::from(input.actions_per_turn % 4) + 1;
    engine.sync(document).unwrap();

    for attempt in &attempts {
        let result = match *attempt {
            FuzzAttempt::Act {
                piece,
                action,
                from_x,
                from_y,
                to_x,
                to_y,
            } => {
                let state = engine.state().unwrap();
                let ids: Vec<PieceId> = state.pieces().map(|p| p.id.clone()).collect();
                let id = ids[usize::from(piece) % ids.len()].clone();
                let action = ActionKind::ALL[usize::from(action) % ActionKind::ALL.len()];
                let to = Coord::new(axis(to_x), axis(to_y));
                let target = match action {
                    ActionKind::ShiftTerrain => Target::Transfer {
                        from: Coord::new(axis(from_x), axis(from_y)),
                        to,
                    },
                    _ => Target::At(to),
                };
                engine.execute_action(&id, action, target).map(|_| ())
            }
            FuzzAttempt::EndTurn => engine.end_turn().map(|_| ()),
            FuzzAttempt::Undo => engine.undo().map(|_| ()),
        };

        if let Err(err) = result {
            assert!(err.is_rule_violation(), "invariant failure: {err}");
        }

        let state = engine.state().unwrap();
        let violations = check_invariants(state);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }

    // The cache and a fresh replay must agree
    let cached = engine.state().unwrap().to_json().unwrap();
    let replayed = to_full_state(engine.persistent(), &PieceCatalog::standard()).unwrap();
    assert_eq!(replayed.to_json().unwrap(), cached);
});
