//! Actions: what pieces can do and how each action is judged.
//!
//! An action is handled in two steps:
//! - [`plan`] resolves it against the pre-state into a [`LogEntry`]
//!   recording every side effect (source cell, captured piece, pool tile,
//!   casualty). Anything that makes the entry impossible to apply is
//!   rejected here.
//! - [`validate`] judges the game rules, seeing both the pre-state and the
//!   post-state produced by applying the entry to a fork.
//!
//! Both only accept [`Simulated`] states.

mod kind;
mod log;
mod movement;
mod place;
mod rules;
mod terrain;

use chrono::{DateTime, Utc};

pub use kind::{ActionFamily, ActionKind, ParseActionError, ParseTargetError, Target, TargetShape};
pub use log::{EntryData, EntryKind, LogEntry};

use crate::error::RuleViolation;
use crate::game::{GameState, Piece, PlayerId, Simulated};
use crate::variant::Variant;

/// One proposed action, bound to the piece that performs it.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Acting piece, as found in the pre-state.
    pub piece: &'a Piece,
    /// Requested action.
    pub action: ActionKind,
    /// Requested target.
    pub target: Target,
    /// Player whose turn it is.
    pub player: &'a PlayerId,
}

/// Resolve an action into the log entry that would record it.
///
/// Runs the checks common to every action first (phase, turn, action
/// allowance, supported action, target shape).
///
/// # Errors
///
/// Returns a rule violation if a common check fails or the action cannot
/// be carried out on this state at all.
pub fn plan(
    ctx: &ActionContext<'_>,
    pre: &GameState<Simulated>,
    timestamp: DateTime<Utc>,
) -> Result<LogEntry, RuleViolation> {
    rules::check_common(ctx, pre)?;
    let (kind, data) = match ctx.action.family() {
        ActionFamily::Place => place::plan(ctx, pre)?,
        ActionFamily::Move => movement::plan(ctx, pre)?,
        ActionFamily::Terrain => terrain::plan(ctx, pre)?,
    };
    Ok(LogEntry {
        kind,
        piece_id: Some(ctx.piece.id.clone()),
        data: EntryData {
            action: Some(ctx.action),
            ..data
        },
        turn_number: pre.turn_number(),
        player: ctx.player.clone(),
        timestamp,
    })
}

/// Judge a planned action against the game rules.
///
/// `post` is `pre` with the planned entry applied. Family rules are checked
/// on `pre`; the citadel connectivity rule is checked on `post`.
///
/// # Errors
///
/// Returns the first rule the action breaks.
pub fn validate(
    ctx: &ActionContext<'_>,
    variant: &dyn Variant,
    pre: &GameState<Simulated>,
    post: &GameState<Simulated>,
) -> Result<(), RuleViolation> {
    match ctx.action.family() {
        ActionFamily::Place => place::validate(ctx, variant, pre)?,
        ActionFamily::Move => movement::validate(ctx, pre)?,
        ActionFamily::Terrain => terrain::validate(ctx)?,
    }
    post.check_citadel_connectivity()
}
