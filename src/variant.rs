//! Rule variants: win conditions and piece availability.
//!
//! A variant only reads game state. The engine asks it after every commit
//! whether the game has ended, and placement validation asks it which
//! piece types may enter the board.

mod first_capture;
mod last_citadel;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use first_capture::FirstCapture;
pub use last_citadel::LastCitadelStanding;

use crate::action::LogEntry;
use crate::game::{GameState, Phase, PieceSpec, PlayerId, Simulated};

/// Name of the default variant.
pub const DEFAULT_VARIANT: &str = last_citadel::NAME;

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    /// Winner, or `None` for a draw.
    pub winner: Option<PlayerId>,
    /// Human-readable explanation.
    pub reason: String,
}

impl GameEnd {
    /// A win for `player`.
    #[must_use]
    pub fn win(player: PlayerId, reason: impl Into<String>) -> Self {
        Self {
            winner: Some(player),
            reason: reason.into(),
        }
    }

    /// A draw.
    #[must_use]
    pub fn draw(reason: impl Into<String>) -> Self {
        Self {
            winner: None,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.winner {
            Some(winner) => write!(f, "{winner} wins: {}", self.reason),
            None => write!(f, "draw: {}", self.reason),
        }
    }
}

/// A pluggable rule set.
pub trait Variant: Send + Sync + fmt::Debug {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Decide whether the game has ended in this state.
    fn check_end(&self, state: &GameState) -> Option<GameEnd>;

    /// Inspect a freshly committed entry; `state` already includes it.
    fn on_action(&self, _entry: &LogEntry, _state: &GameState) -> Option<GameEnd> {
        None
    }

    /// Whether a piece type may be placed in this state.
    ///
    /// Placement is only ever judged on a simulation.
    fn is_available(&self, spec: &PieceSpec, state: &GameState<Simulated>) -> bool {
        classic_availability(spec, state.phase())
    }
}

/// Setup admits terrain and home bases; play admits every other unit.
///
/// Terrain enters play only through a builder.
#[must_use]
pub fn classic_availability(spec: &PieceSpec, phase: Phase) -> bool {
    match phase {
        Phase::Setup => spec.is_terrain() || spec.home_base,
        Phase::Active => !spec.is_terrain() && !spec.home_base,
        Phase::Lobby | Phase::Finished => false,
    }
}

/// Look up a shipped variant by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Arc<dyn Variant>> {
    match name {
        first_capture::NAME => Some(Arc::new(FirstCapture)),
        last_citadel::NAME => Some(Arc::new(LastCitadelStanding)),
        _ => None,
    }
}

/// Names of every shipped variant.
pub const VARIANTS: [&str; 2] = [first_capture::NAME, last_citadel::NAME];
