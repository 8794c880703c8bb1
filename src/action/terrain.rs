//! Terrain family: a builder raising, shifting and sinking tiles around it.
//!
//! The builder reaches the eight cells around it. Sinking may also target
//! the builder's own cell, in which case the builder goes down with the
//! tile.

use crate::action::{ActionContext, ActionKind, EntryData, EntryKind, Target};
use crate::error::RuleViolation;
use crate::game::{kinds, Coord, GameState, Simulated, TerrainKind};

fn origin(ctx: &ActionContext<'_>) -> Result<Coord, RuleViolation> {
    ctx.piece
        .coord()
        .ok_or_else(|| RuleViolation::NotOnBoard(ctx.piece.id.clone()))
}

pub(super) fn plan(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
) -> Result<(EntryKind, EntryData), RuleViolation> {
    let builder = origin(ctx)?;
    let board = pre.board();

    match (ctx.action, ctx.target) {
        (ActionKind::ShiftTerrain, Target::Transfer { from, to }) => {
            if from == to {
                return Err(RuleViolation::SameCoordinate(to));
            }
            let tile = board
                .terrain_at(from)
                .cloned()
                .ok_or(RuleViolation::NoTerrain(from))?;
            if board.piece_at(from).is_some() {
                return Err(RuleViolation::Occupied(from));
            }
            if board.has_terrain(to) {
                return Err(RuleViolation::TerrainPresent(to));
            }
            Ok((
                EntryKind::ShiftTerrain,
                EntryData {
                    from: Some(from),
                    to: Some(to),
                    tile: Some(tile),
                    ..EntryData::default()
                },
            ))
        }
        (ActionKind::SinkTerrain, Target::At(at)) => {
            let tile = board
                .terrain_at(at)
                .cloned()
                .ok_or(RuleViolation::NoTerrain(at))?;
            let casualty = match board.piece_at(at) {
                Some(id) if at == builder => Some(id.clone()),
                Some(_) => return Err(RuleViolation::Occupied(at)),
                None => None,
            };
            Ok((
                EntryKind::SinkTerrain,
                EntryData {
                    from: Some(at),
                    tile: Some(tile),
                    casualty,
                    ..EntryData::default()
                },
            ))
        }
        (_, target) => {
            let to = target.destination();
            if board.has_terrain(to) {
                return Err(RuleViolation::TerrainPresent(to));
            }
            let tile = pre
                .pool_tile(TerrainKind::Land)
                .cloned()
                .ok_or_else(|| RuleViolation::PoolExhausted(kinds::LAND.to_string()))?;
            Ok((
                EntryKind::RaiseTerrain,
                EntryData {
                    to: Some(to),
                    tile: Some(tile),
                    ..EntryData::default()
                },
            ))
        }
    }
}

pub(super) fn validate(ctx: &ActionContext<'_>) -> Result<(), RuleViolation> {
    let builder = origin(ctx)?;
    let reach = |target: Coord| {
        if builder.is_adjacent_to(target) {
            Ok(())
        } else {
            Err(RuleViolation::OutOfReach {
                from: builder,
                target,
            })
        }
    };

    match (ctx.action, ctx.target) {
        (ActionKind::ShiftTerrain, Target::Transfer { from, to }) => {
            reach(from)?;
            reach(to)
        }
        (ActionKind::SinkTerrain, Target::At(at)) if at == builder => Ok(()),
        (_, target) => reach(target.destination()),
    }
}
