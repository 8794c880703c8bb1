//! Copy-and-test validation and target enumeration.
//!
//! Validation never touches the live state: it plans the action on a
//! simulation of it, applies the plan to a fork of that simulation and
//! judges the pair.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::action::{self, ActionContext, ActionKind, LogEntry, Target, TargetShape};
use crate::error::{EngineResult, RuleViolation};
use crate::game::{Coord, Extent, GameState, PieceId};
use crate::variant::Variant;

/// Run the copy-and-test protocol for one proposed action.
///
/// Returns the entry that would record the action.
///
/// # Errors
///
/// Returns a rule violation if the action is illegal, or an invariant
/// failure if the piece does not exist or the plan cannot be applied.
pub fn check(
    live: &GameState,
    variant: &dyn Variant,
    piece: &PieceId,
    kind: ActionKind,
    target: Target,
    timestamp: DateTime<Utc>,
) -> EngineResult<LogEntry> {
    let pre = live.simulate();
    let acting = pre.require_piece(piece)?;
    let player = pre.current_player().ok_or(RuleViolation::NoPlayers)?;
    let ctx = ActionContext {
        piece: acting,
        action: kind,
        target,
        player,
    };

    let entry = action::plan(&ctx, &pre, timestamp)?;
    let mut post = pre.fork();
    post.apply_entry(&entry)?;
    action::validate(&ctx, variant, &pre, &post)?;
    Ok(entry)
}

/// Every target for which [`check`] succeeds.
///
/// Candidates are the cells of the board's extent grown by `margin` (a
/// single cell at the origin on an empty board); transfer actions try
/// every ordered pair of distinct cells. Targets come back in row-major
/// order.
///
/// # Errors
///
/// Returns an invariant failure if the piece does not exist.
pub fn valid_targets(
    live: &GameState,
    variant: &dyn Variant,
    piece: &PieceId,
    kind: ActionKind,
    margin: i32,
    timestamp: DateTime<Utc>,
) -> EngineResult<Vec<Target>> {
    if !live.require_piece(piece)?.spec.supports(kind) {
        return Ok(Vec::new());
    }

    let origin = Coord::new(0, 0);
    let extent = live
        .board()
        .extent()
        .unwrap_or(Extent {
            min: origin,
            max: origin,
        })
        .expand(margin);
    let cells: Vec<Coord> = extent.coords().collect();

    let candidates: Vec<Target> = match kind.target_shape() {
        TargetShape::Cell => cells.iter().copied().map(Target::At).collect(),
        TargetShape::Transfer => cells
            .iter()
            .flat_map(|&from| {
                cells
                    .iter()
                    .filter(move |&&to| to != from)
                    .map(move |&to| Target::Transfer { from, to })
            })
            .collect(),
    };

    Ok(candidates
        .into_par_iter()
        .filter(|&target| check(live, variant, piece, kind, target, timestamp).is_ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::game::kinds;
    use crate::testing::{stamp, Fixture};
    use crate::variant::LastCitadelStanding;

    #[test]
    fn test_check_leaves_live_state_untouched() {
        let state = Fixture::new(&["alice", "bob"])
            .land(&[Coord::new(0, 0), Coord::new(1, 0)])
            .unit("alice", kinds::GUARD, Coord::new(0, 0))
            .build();
        let before = state.to_json().unwrap();

        let piece = PieceId::from("alice:guard:0");
        let entry = check(
            &state,
            &LastCitadelStanding,
            &piece,
            ActionKind::Step,
            Coord::new(1, 0).into(),
            stamp(),
        )
        .unwrap();
        assert_eq!(entry.data.to, Some(Coord::new(1, 0)));

        let err = check(
            &state,
            &LastCitadelStanding,
            &piece,
            ActionKind::Step,
            Coord::new(5, 5).into(),
            stamp(),
        )
        .unwrap_err();
        assert!(err.is_rule_violation());
        assert_eq!(state.to_json().unwrap(), before);
    }

    #[test]
    fn test_missing_piece_is_invariant_failure() {
        let state = Fixture::new(&["alice"]).build();
        let err = check(
            &state,
            &LastCitadelStanding,
            &PieceId::from("alice:ghost:0"),
            ActionKind::Step,
            Coord::new(0, 0).into(),
            stamp(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }

    #[test]
    fn test_lancer_targets_on_open_square() {
        let state = Fixture::new(&["alice", "bob"])
            .land_rect(Coord::new(0, 0), Coord::new(2, 2))
            .unit("alice", kinds::LANCER, Coord::new(1, 1))
            .build();
        let targets = valid_targets(
            &state,
            &LastCitadelStanding,
            &PieceId::from("alice:lancer:0"),
            ActionKind::Slide,
            2,
            stamp(),
        )
        .unwrap();
        assert_eq!(
            targets,
            vec![
                Target::At(Coord::new(1, 0)),
                Target::At(Coord::new(0, 1)),
                Target::At(Coord::new(2, 1)),
                Target::At(Coord::new(1, 2)),
            ]
        );
    }

    #[test]
    fn test_unsupported_action_has_no_targets() {
        let state = Fixture::new(&["alice"])
            .land(&[Coord::new(0, 0)])
            .unit("alice", kinds::GUARD, Coord::new(0, 0))
            .build();
        let targets = valid_targets(
            &state,
            &LastCitadelStanding,
            &PieceId::from("alice:guard:0"),
            ActionKind::Slide,
            2,
            stamp(),
        )
        .unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_shift_targets_are_pairs() {
        let state = Fixture::new(&["alice", "bob"])
            .land(&[Coord::new(0, 0), Coord::new(1, 0)])
            .unit("alice", kinds::BUILDER, Coord::new(0, 0))
            .build();
        let targets = valid_targets(
            &state,
            &LastCitadelStanding,
            &PieceId::from("alice:builder:0"),
            ActionKind::ShiftTerrain,
            1,
            stamp(),
        )
        .unwrap();
        // The only movable tile is (1,0); it can go to any of the builder's
        // seven other neighbours.
        assert_eq!(targets.len(), 7);
        assert!(targets.iter().all(|t| matches!(
            t,
            Target::Transfer { from, .. } if *from == Coord::new(1, 0)
        )));
    }
}
