//! Structural invariants - sanity checks that detect bugs.
//!
//! Entries the engine validated never fail these. A replayed log or a
//! restored snapshot can, so both run the checks and refuse a state that
//! fails them.

use std::collections::BTreeSet;

use crate::error::InvariantFailure;
use crate::game::{GameState, Layer, Location, Mode, PieceId};

/// Check all structural invariants.
///
/// Returns the failures found, or an empty list if the state is sound:
/// - every piece sits in exactly the container its location names
/// - each board layer holds pieces of the matching class
/// - every unit on the board stands on terrain
/// - the current-player index points at a seated player
#[must_use]
pub fn check_invariants<M: Mode>(state: &GameState<M>) -> Vec<InvariantFailure> {
    let mut failures = Vec::new();
    let mut seen: BTreeSet<&PieceId> = BTreeSet::new();

    let mut note = |piece: &PieceId, reason: String| {
        failures.push(InvariantFailure::InconsistentLocation {
            piece: piece.clone(),
            reason,
        });
    };

    for (coord, cell) in state.board().iter() {
        for layer in [Layer::Terrain, Layer::Piece] {
            let Some(id) = cell.occupant(layer) else {
                continue;
            };
            if !seen.insert(id) {
                note(id, "held by more than one container".to_string());
            }
            match state.piece(id) {
                None => note(id, format!("on the board at {coord} but unknown")),
                Some(piece) => {
                    if piece.location != Location::Board(coord) {
                        note(id, format!("on the board at {coord} but located elsewhere"));
                    }
                    if piece.spec.class.layer() != layer {
                        note(id, format!("in the wrong layer at {coord}"));
                    }
                }
            }
        }
        if cell.piece.is_some() && cell.terrain.is_none() {
            if let Some(id) = &cell.piece {
                note(id, format!("unit at {coord} has no terrain beneath it"));
            }
        }
    }

    let containers = state
        .stashes()
        .iter()
        .map(|(player, ids)| (Location::Stash(player.clone()), ids.as_slice()))
        .chain([
            (Location::Pool, state.pool()),
            (Location::Graveyard, state.graveyard()),
        ]);
    for (location, ids) in containers {
        for id in ids {
            if !seen.insert(id) {
                note(id, "held by more than one container".to_string());
            }
            match state.piece(id) {
                None => note(id, "listed off the board but unknown".to_string()),
                Some(piece) if piece.location != location => {
                    note(id, format!("listed in {location:?} but located elsewhere"));
                }
                Some(_) => {}
            }
        }
    }

    for piece in state.pieces() {
        if !seen.contains(&piece.id) {
            note(&piece.id, "not held by any container".to_string());
        }
    }

    if !state.players().is_empty() && state.current_player().is_none() {
        failures.push(InvariantFailure::CurrentPlayerOutOfRange {
            index: state.current_index(),
            seated: state.players().len(),
        });
    }

    failures
}
