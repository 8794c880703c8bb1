//! Place family: bringing a piece from a stash or the pool onto the board.

use crate::action::{ActionContext, EntryData, EntryKind};
use crate::error::RuleViolation;
use crate::game::{GameState, Location, Simulated, TerrainKind};
use crate::variant::Variant;

pub(super) fn plan(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
) -> Result<(EntryKind, EntryData), RuleViolation> {
    match ctx.piece.location {
        Location::Stash(_) | Location::Pool => {}
        Location::Board(_) | Location::Graveyard => {
            return Err(RuleViolation::NotInReserve(ctx.piece.id.clone()));
        }
    }

    let to = ctx.target.destination();
    let layer = ctx.piece.spec.class.layer();
    if pre.board().occupant(to, layer).is_some() {
        return Err(RuleViolation::Occupied(to));
    }

    Ok((
        EntryKind::Place,
        EntryData {
            to: Some(to),
            ..EntryData::default()
        },
    ))
}

pub(super) fn validate(
    ctx: &ActionContext<'_>,
    variant: &dyn Variant,
    pre: &GameState<Simulated>,
) -> Result<(), RuleViolation> {
    let spec = &ctx.piece.spec;
    if !variant.is_available(spec, pre) {
        return Err(RuleViolation::NotAvailable {
            piece_type: spec.name.clone(),
            phase: pre.phase(),
        });
    }

    if spec.is_terrain() {
        return Ok(());
    }

    let to = ctx.target.destination();
    match pre.terrain_kind_at(to) {
        None => Err(RuleViolation::NoTerrain(to)),
        Some(TerrainKind::Water) if !spec.water_capable => Err(RuleViolation::Water(to)),
        Some(_) => Ok(()),
    }
}
