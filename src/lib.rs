// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Citadel: a deterministic, event-sourced rules engine for a two-layer
//! tile-placement strategy game.
//!
//! The board is an unbounded grid where every cell has a terrain layer and
//! a piece layer. Players take turns placing pieces, moving them, capturing
//! and reshaping the terrain until a pluggable win condition is met.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Engine (copy-and-test, cache)     │
//! ├─────────────────────────────────────┤
//! │   Actions · Variants                │
//! ├─────────────────────────────────────┤
//! │   GameState<Live | Simulated>       │
//! ├─────────────────────────────────────┤
//! │   PersistentState + Replay          │
//! └─────────────────────────────────────┘
//! ```
//!
//! Only the [`PersistentState`] (initial configuration plus action log) is
//! authoritative. Every [`GameState`] is derived by replaying it.

pub mod action;
pub mod clock;
pub mod engine;
pub mod error;
pub mod game;
pub mod replay;
pub mod variant;

#[cfg(test)]
mod testing;

pub use action::{ActionKind, LogEntry, Target};
pub use engine::{Committed, Engine, EngineConfig};
pub use error::{EngineError, EngineResult, InvariantFailure, RuleViolation};

// Re-export key game types at crate root for convenience
pub use game::{Coord, GameState, Phase, PieceCatalog, PieceId, PlayerId};
pub use replay::{InitialConfig, PersistentState, SetupParams};
pub use variant::{GameEnd, Variant};
