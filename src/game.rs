//! Game layer for Citadel.
//!
//! The data model the rules operate on:
//! - Integer coordinates on an unbounded grid
//! - A sparse board with a terrain layer and a piece layer
//! - Players and piece ownership
//! - Piece types as data, rebuilt through a [`PieceFactory`]
//! - The game state and its single mutation path

mod board;
mod coord;
mod invariants;
mod piece;
mod player;
mod state;

pub use board::{Board, Cell, Extent, Layer, LinePolicy};
pub use coord::{Coord, ParseCoordError};
pub use invariants::check_invariants;
pub use piece::{
    kinds, Location, Piece, PieceCatalog, PieceClass, PieceFactory, PieceId, PieceRecord,
    PieceSpec, TerrainKind, POOL_PREFIX,
};
pub use player::{Owner, PlayerId};
pub use state::{CellSnapshot, GameState, Live, Mode, Phase, Simulated, StateSnapshot};
