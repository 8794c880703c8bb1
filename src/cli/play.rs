//! Turn commands: place, act and end-turn.

use super::output::format_committed;
use super::{load_engine, save_engine, CliError};
use citadel::{ActionKind, Committed, Coord, Engine, PieceId, Target};
use std::path::Path;

/// Execute the place command.
///
/// # Errors
///
/// Returns an error if the placement is illegal.
pub(crate) fn place(path: &Path, piece: &str, at: Coord) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let committed = engine.place_piece(&PieceId::from(piece), at)?;
    finish(&engine, path, &committed)
}

/// Execute the act command.
///
/// # Errors
///
/// Returns an error if the action is illegal.
pub(crate) fn act(path: &Path, piece: &str, action: ActionKind, target: Target) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let committed = engine.execute_action(&PieceId::from(piece), action, target)?;
    finish(&engine, path, &committed)
}

/// Execute the end-turn command.
///
/// # Errors
///
/// Returns an error outside setup and play.
pub(crate) fn end_turn(path: &Path) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let committed = engine.end_turn()?;
    finish(&engine, path, &committed)
}

fn finish(engine: &Engine, path: &Path, committed: &Committed) -> Result<(), CliError> {
    save_engine(engine, path)?;
    print!("{}", format_committed(committed));
    Ok(())
}
