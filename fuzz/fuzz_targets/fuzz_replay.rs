#![no_main]

//! Persistent-document fuzzer.
//!
//! Feeds arbitrary bytes to the document loader and, when they parse,
//! replays the log. Loading and replay must reject bad input with an
//! error, never a panic, and whatever replays must pass the structural
//! checks.

use citadel::game::check_invariants;
use citadel::replay::to_full_state;
use citadel::{PersistentState, PieceCatalog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let catalog = PieceCatalog::standard();
    let Ok(persistent) = PersistentState::from_json(text, &catalog) else {
        return;
    };

    // Stay clear of huge generated configurations
    let pieces: u64 = persistent
        .initial
        .setup
        .stash
        .values()
        .chain(persistent.initial.pool.values())
        .map(|&count| u64::from(count))
        .sum();
    if pieces * (persistent.initial.players.len() as u64 + 1) > 10_000 {
        return;
    }

    let Ok(state) = to_full_state(&persistent, &catalog) else {
        return;
    };
    let violations = check_invariants(&state);
    assert!(violations.is_empty(), "replay accepted an inconsistent state: {violations:?}");
    let json = state.to_json().unwrap();
    assert!(!json.is_empty());
});
