//! Board fixtures for unit tests.
//!
//! Builds states by applying placement entries directly, bypassing the
//! rules, so a test can start from any layout.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::action::{EntryData, EntryKind, LogEntry};
use crate::game::{kinds, Coord, GameState, Phase, PieceCatalog, PieceId, PlayerId};
use crate::replay::{InitialConfig, SetupParams};

/// Fixed timestamp for deterministic entries.
pub(crate) fn stamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Fluent builder for a test state.
pub(crate) struct Fixture {
    initial: InitialConfig,
    placements: Vec<(PieceId, Coord)>,
    counters: BTreeMap<String, u32>,
}

impl Fixture {
    /// Players with four of every unit type and a generous pool.
    pub(crate) fn new(players: &[&str]) -> Self {
        let stash = [
            kinds::CITADEL,
            kinds::LANCER,
            kinds::GUARD,
            kinds::SKIFF,
            kinds::BUILDER,
        ]
        .into_iter()
        .map(|name| (name.to_string(), 4))
        .collect();
        let initial = InitialConfig {
            players: players.iter().map(|&p| PlayerId::from(p)).collect(),
            phase: Phase::Active,
            setup: SetupParams {
                stash,
                actions_per_turn: 1,
            },
            pool: BTreeMap::from([(kinds::LAND.to_string(), 40), (kinds::WATER.to_string(), 10)]),
            ..InitialConfig::default()
        };
        Self {
            initial,
            placements: Vec::new(),
            counters: BTreeMap::new(),
        }
    }

    pub(crate) fn phase(mut self, phase: Phase) -> Self {
        self.initial.phase = phase;
        self
    }

    #[allow(dead_code)]
    pub(crate) fn actions_per_turn(mut self, actions: u32) -> Self {
        self.initial.setup.actions_per_turn = actions;
        self
    }

    pub(crate) fn pool(mut self, kind: &str, count: u32) -> Self {
        self.initial.pool.insert(kind.to_string(), count);
        self
    }

    fn next_id(&mut self, prefix: &str, kind: &str) -> PieceId {
        let counter = self.counters.entry(format!("{prefix}:{kind}")).or_default();
        let id = PieceId::new(format!("{prefix}:{kind}:{counter}"));
        *counter += 1;
        id
    }

    /// Lay land tiles from the pool.
    pub(crate) fn land(mut self, coords: &[Coord]) -> Self {
        for &coord in coords {
            let id = self.next_id("pool", kinds::LAND);
            self.placements.push((id, coord));
        }
        self
    }

    /// Lay a rectangle of land, corners inclusive.
    pub(crate) fn land_rect(self, min: Coord, max: Coord) -> Self {
        let coords: Vec<Coord> = (min.y..=max.y)
            .flat_map(|y| (min.x..=max.x).map(move |x| Coord::new(x, y)))
            .collect();
        self.land(&coords)
    }

    /// Lay water tiles from the pool.
    pub(crate) fn water(mut self, coords: &[Coord]) -> Self {
        for &coord in coords {
            let id = self.next_id("pool", kinds::WATER);
            self.placements.push((id, coord));
        }
        self
    }

    /// Put a player's unit on the board (terrain must already be there).
    pub(crate) fn unit(mut self, player: &str, kind: &str, coord: Coord) -> Self {
        let id = self.next_id(player, kind);
        self.placements.push((id, coord));
        self
    }

    /// Apply every placement and hand the turn to the first player.
    pub(crate) fn build(self) -> GameState {
        let mut state = GameState::from_initial(&self.initial, &PieceCatalog::standard()).unwrap();
        let Some(last) = self.initial.players.last().cloned() else {
            return state;
        };
        for (id, to) in self.placements {
            let entry = LogEntry {
                kind: EntryKind::Place,
                piece_id: Some(id),
                data: EntryData {
                    to: Some(to),
                    ..EntryData::default()
                },
                turn_number: 0,
                player: last.clone(),
                timestamp: stamp(),
            };
            state.apply_entry(&entry).unwrap();
        }
        state
            .apply_entry(&LogEntry::end_turn(last, 0, stamp()))
            .unwrap();
        state
    }
}
