//! Game creation, phase changes and undo.

use super::{load_engine, save_engine, CliError};
use citadel::{Engine, InitialConfig, PieceCatalog, PlayerId, SetupParams};
use std::path::Path;
use std::sync::Arc;

/// Execute the new command.
///
/// # Errors
///
/// Returns an error if the file exists (without `force`), the variant is
/// unknown or the file cannot be written.
pub(crate) fn create(
    path: &Path,
    players: Vec<String>,
    variant: String,
    actions: u32,
    force: bool,
) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::new(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let initial = InitialConfig {
        players: players.into_iter().map(PlayerId::new).collect(),
        variant,
        setup: SetupParams {
            actions_per_turn: actions,
            ..SetupParams::default()
        },
        ..InitialConfig::default()
    };
    let engine = Engine::new(initial, Arc::new(PieceCatalog::standard()))?;
    save_engine(&engine, path)?;

    println!("Created {} ({})", path.display(), engine.variant().name());
    Ok(())
}

/// Execute the setup command.
///
/// # Errors
///
/// Returns an error if the game is not in the lobby.
pub(crate) fn open_setup(path: &Path) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    engine.open_setup()?;
    save_engine(&engine, path)?;
    println!("Setup phase opened");
    Ok(())
}

/// Execute the begin command.
///
/// # Errors
///
/// Returns an error if setup is incomplete.
pub(crate) fn begin(path: &Path) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    engine.begin_play()?;
    save_engine(&engine, path)?;
    println!("Play started");
    Ok(())
}

/// Execute the undo command.
///
/// # Errors
///
/// Returns an error if the log is empty.
pub(crate) fn undo(path: &Path) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let entry = engine.undo()?;
    save_engine(&engine, path)?;
    println!(
        "Undid {:?} by {} (log now {} entries)",
        entry.kind,
        entry.player,
        engine.persistent().revision()
    );
    Ok(())
}
