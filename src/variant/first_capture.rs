//! First capture of a home base wins.

use crate::action::{EntryKind, LogEntry};
use crate::game::{GameState, Phase};
use crate::variant::{GameEnd, Variant};

pub(super) const NAME: &str = "first-capture";

/// The first player to capture an enemy citadel wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCapture;

impl FirstCapture {
    /// Whether an entry captured a home-base piece.
    fn takes_citadel(entry: &LogEntry, state: &GameState) -> bool {
        entry.kind == EntryKind::Move
            && entry
                .data
                .captured
                .as_ref()
                .and_then(|id| state.piece(id))
                .is_some_and(|piece| piece.spec.home_base)
    }
}

impl Variant for FirstCapture {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check_end(&self, state: &GameState) -> Option<GameEnd> {
        if !matches!(state.phase(), Phase::Active | Phase::Finished) {
            return None;
        }
        state
            .log()
            .iter()
            .find(|entry| Self::takes_citadel(entry, state))
            .map(|entry| GameEnd::win(entry.player.clone(), "captured a citadel"))
    }

    fn on_action(&self, entry: &LogEntry, state: &GameState) -> Option<GameEnd> {
        (state.phase() == Phase::Active && Self::takes_citadel(entry, state))
            .then(|| GameEnd::win(entry.player.clone(), "captured a citadel"))
    }
}
