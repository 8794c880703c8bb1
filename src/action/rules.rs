//! Checks shared by every action.

use crate::action::{ActionContext, ActionFamily, TargetShape};
use crate::error::RuleViolation;
use crate::game::{GameState, Owner, Phase, Simulated};

/// Phase, turn, allowance, capability and target shape.
pub(super) fn check_common(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
) -> Result<(), RuleViolation> {
    match pre.phase() {
        Phase::Finished => return Err(RuleViolation::GameOver),
        Phase::Lobby => return Err(RuleViolation::WrongPhase(Phase::Lobby)),
        // Only placement happens before play starts
        Phase::Setup if ctx.action.family() != ActionFamily::Place => {
            return Err(RuleViolation::WrongPhase(Phase::Setup));
        }
        Phase::Setup | Phase::Active => {}
    }

    if !ctx.piece.owner.acts_for(ctx.player) {
        if let Owner::Player(owner) = &ctx.piece.owner {
            return Err(RuleViolation::NotYourTurn {
                player: owner.clone(),
            });
        }
    }

    if pre.actions_this_turn() >= pre.actions_per_turn() {
        return Err(RuleViolation::ActionLimitReached {
            limit: pre.actions_per_turn(),
        });
    }

    if !ctx.piece.spec.supports(ctx.action) {
        return Err(RuleViolation::UnsupportedAction {
            piece: ctx.piece.id.clone(),
            action: ctx.action,
        });
    }

    let expected = ctx.action.target_shape();
    if ctx.target.shape() != expected {
        return Err(RuleViolation::WrongTargetShape {
            action: ctx.action,
            expected: match expected {
                TargetShape::Cell => "single-cell",
                TargetShape::Transfer => "from>to",
            },
        });
    }

    Ok(())
}
