//! Move family: relocating an on-board piece, possibly capturing.

use crate::action::{ActionContext, ActionKind, EntryData, EntryKind};
use crate::error::RuleViolation;
use crate::game::{Coord, GameState, LinePolicy, Simulated, TerrainKind};

/// The acting piece's board coordinate.
fn origin(ctx: &ActionContext<'_>) -> Result<Coord, RuleViolation> {
    ctx.piece
        .coord()
        .ok_or_else(|| RuleViolation::NotOnBoard(ctx.piece.id.clone()))
}

pub(super) fn plan(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
) -> Result<(EntryKind, EntryData), RuleViolation> {
    let from = origin(ctx)?;
    let to = ctx.target.destination();
    if to == from {
        return Err(RuleViolation::SameCoordinate(to));
    }

    // Whoever stands on the target goes to the graveyard; validation
    // decides whether that is allowed.
    let captured = pre.board().piece_at(to).cloned();

    Ok((
        EntryKind::Move,
        EntryData {
            from: Some(from),
            to: Some(to),
            captured,
            ..EntryData::default()
        },
    ))
}

pub(super) fn validate(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
) -> Result<(), RuleViolation> {
    let from = origin(ctx)?;
    let to = ctx.target.destination();

    check_reach(ctx.action, pre, from, to)?;

    match pre.terrain_kind_at(to) {
        None => return Err(RuleViolation::NoTerrain(to)),
        Some(TerrainKind::Water) if !ctx.piece.spec.water_capable => {
            return Err(RuleViolation::Water(to));
        }
        Some(_) => {}
    }

    if let Some(occupant) = pre.unit_at(to) {
        if occupant.owner == ctx.piece.owner {
            return Err(RuleViolation::FriendlyOccupant(to));
        }
        if !ctx.action.captures() {
            return Err(RuleViolation::CaptureNotAllowed(to));
        }
    }

    Ok(())
}

/// Per-action movement pattern.
fn check_reach(
    action: ActionKind,
    pre: &GameState<Simulated>,
    from: Coord,
    to: Coord,
) -> Result<(), RuleViolation> {
    let out_of_reach = RuleViolation::OutOfReach { from, target: to };
    match action {
        ActionKind::Step if from.is_adjacent_to(to) => Ok(()),
        ActionKind::Paddle | ActionKind::Walk if from.is_orthogonally_adjacent_to(to) => Ok(()),
        ActionKind::Slide if from.is_collinear_with(to) => pre
            .board()
            .clear_line(from, to, LinePolicy::Supported)
            .map_err(|blocked| RuleViolation::PathBlocked {
                from,
                target: to,
                blocked,
            }),
        _ => Err(out_of_reach),
    }
}
