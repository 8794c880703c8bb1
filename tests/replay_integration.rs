//! Persistence and replay integration tests.
//!
//! These verify that a game survives a trip through a file, that the stored
//! document holds only the configuration and the log, and that undo and
//! rewind agree with replaying a prefix of the log.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use citadel::clock::FixedClock;
use citadel::replay::{state_at, to_full_state};
use citadel::{
    ActionKind, Coord, Engine, InitialConfig, PersistentState, Phase, PieceCatalog, PieceId,
    PlayerId, SetupParams,
};
use tempfile::NamedTempFile;

fn id(s: &str) -> PieceId {
    PieceId::from(s)
}

/// A short game: a strip of land, citadels at both ends, then a few
/// guard moves.
fn played_game() -> Engine {
    let initial = InitialConfig {
        players: vec![PlayerId::from("alice"), PlayerId::from("bob")],
        setup: SetupParams {
            actions_per_turn: 10,
            ..SetupParams::default()
        },
        ..InitialConfig::default()
    };
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut engine = Engine::new(initial, Arc::new(PieceCatalog::standard()))
        .unwrap()
        .with_clock(Arc::new(FixedClock(stamp)));

    engine.open_setup().unwrap();
    for x in 0..6 {
        engine
            .place_piece(&id(&format!("pool:land:{x}")), Coord::new(x, 0))
            .unwrap();
    }
    engine.place_piece(&id("alice:citadel:0"), Coord::new(0, 0)).unwrap();
    engine.end_turn().unwrap();
    engine.place_piece(&id("bob:citadel:0"), Coord::new(5, 0)).unwrap();
    engine.end_turn().unwrap();
    engine.begin_play().unwrap();

    engine.place_piece(&id("alice:guard:0"), Coord::new(1, 0)).unwrap();
    engine
        .execute_action(&id("alice:guard:0"), ActionKind::Step, Coord::new(2, 0).into())
        .unwrap();
    engine.end_turn().unwrap();
    engine.place_piece(&id("bob:guard:0"), Coord::new(4, 0)).unwrap();
    engine.end_turn().unwrap();
    engine
}

#[test]
fn test_file_roundtrip_restores_state() {
    let mut engine = played_game();
    let expected = engine.state().unwrap().to_json().unwrap();

    let temp_file = NamedTempFile::new().expect("create temp file");
    engine.persistent().save(temp_file.path()).expect("save game");

    let factory = Arc::new(PieceCatalog::standard());
    let loaded = PersistentState::load(temp_file.path(), &*factory).expect("load game");
    assert_eq!(&loaded, engine.persistent());

    let mut reopened = Engine::from_persistent(loaded, factory).unwrap();
    assert_eq!(reopened.state().unwrap().to_json().unwrap(), expected);
    assert_eq!(reopened.state().unwrap().phase(), Phase::Active);
}

#[test]
fn test_document_holds_no_derived_fields() {
    let engine = played_game();
    let json: serde_json::Value = serde_json::from_str(&engine.persistent().to_json().unwrap()).unwrap();

    let object = json.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["actions", "initial", "lastModified"]);

    let first = &json["actions"][0];
    assert_eq!(first["type"], "place");
    assert_eq!(first["pieceId"], "pool:land:0");
    assert_eq!(first["data"]["to"], "0,0");
    assert_eq!(first["player"], "alice");
    assert!(first["data"].get("captured").is_none());

    let end_turn = json["actions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["type"] == "endTurn")
        .unwrap();
    assert!(end_turn["pieceId"].is_null());
}

#[test]
fn test_undo_matches_replaying_a_prefix() {
    let mut engine = played_game();
    let catalog = PieceCatalog::standard();
    let len = engine.persistent().revision();
    let prefix = state_at(engine.persistent(), &catalog, len - 2).unwrap();

    engine.undo().unwrap();
    engine.undo().unwrap();
    assert_eq!(engine.persistent().revision(), len - 2);
    assert_eq!(
        engine.state().unwrap().to_json().unwrap(),
        prefix.to_json().unwrap()
    );
}

#[test]
fn test_rewind_then_replay_again() {
    let mut engine = played_game();
    let catalog = PieceCatalog::standard();

    // Rewind to just after play started: no guards on the board
    let started = engine
        .persistent()
        .actions
        .iter()
        .position(|entry| entry.piece_id == Some(id("alice:guard:0")))
        .unwrap();
    engine.rewind_to(started).unwrap();
    let state = engine.state().unwrap();
    assert!(state.unit_at(Coord::new(1, 0)).is_none());
    assert!(state.unit_at(Coord::new(2, 0)).is_none());
    assert_eq!(state.current_player(), Some(&PlayerId::from("alice")));

    // The same guard can be placed again from the stash
    engine.place_piece(&id("alice:guard:0"), Coord::new(3, 0)).unwrap();
    let replayed = to_full_state(engine.persistent(), &catalog).unwrap();
    assert_eq!(
        replayed.board().piece_at(Coord::new(3, 0)),
        Some(&id("alice:guard:0"))
    );
}

#[test]
fn test_sync_adopts_a_newer_document() {
    let mut writer = played_game();
    let mut reader = Engine::from_persistent(
        writer.persistent().clone(),
        Arc::new(PieceCatalog::standard()),
    )
    .unwrap();
    assert_eq!(reader.state().unwrap().log_len(), writer.persistent().revision());

    writer
        .execute_action(&id("alice:guard:0"), ActionKind::Step, Coord::new(3, 0).into())
        .unwrap();
    reader.sync(writer.persistent().clone()).unwrap();

    assert_eq!(
        reader.state().unwrap().to_json().unwrap(),
        writer.state().unwrap().to_json().unwrap()
    );
}
