//! Read-only commands: targets, show and verify.

use super::output::{format_report, format_targets, JsonTargets};
use super::{load_engine, CliError, OutputFormat};
use citadel::replay::{render_ascii, state_at, verify as verify_document};
use citadel::{ActionKind, PersistentState, PieceCatalog, PieceId};
use std::path::Path;

/// Execute the targets command.
///
/// # Errors
///
/// Returns an error if the piece does not exist.
pub(crate) fn targets(
    path: &Path,
    piece: &str,
    action: Option<ActionKind>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let piece = PieceId::from(piece);
    let actions = match action {
        Some(action) => vec![(action, engine.valid_targets(&piece, action)?)],
        None => engine.valid_actions_for_piece(&piece)?,
    };

    match format {
        OutputFormat::Text => print!("{}", format_targets(&piece, &actions)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonTargets::new(&piece, &actions))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the game cannot be replayed.
pub(crate) fn show(
    path: &Path,
    at: Option<usize>,
    format: OutputFormat,
    color: bool,
) -> Result<(), CliError> {
    let mut engine = load_engine(path)?;
    let state = match at {
        Some(n) => state_at(engine.persistent(), &PieceCatalog::standard(), n)
            .map_err(|e| CliError::new(e.to_string()))?,
        None => engine.state()?.clone(),
    };

    match format {
        OutputFormat::Text => {
            print!("{}", render_ascii(&state, color));
            let end = match at {
                Some(_) => None,
                None => engine.check_game_end()?,
            };
            if let Some(end) = end {
                println!("Game over: {end}");
            }
        }
        OutputFormat::Json => println!("{}", state.to_json_pretty()?),
    }
    Ok(())
}

/// Execute the verify command.
///
/// # Errors
///
/// Returns an error if the document does not replay cleanly.
pub(crate) fn verify(path: &Path) -> Result<(), CliError> {
    let catalog = PieceCatalog::standard();
    let persistent = PersistentState::load(path, &catalog)
        .map_err(|e| CliError::new(format!("Failed to load game {}: {e}", path.display())))?;

    println!("Verifying: {}", path.display());
    let report = verify_document(&persistent, &catalog)?;
    print!("{}", format_report(&report));

    if report.is_ok() {
        println!("Verification successful!");
        Ok(())
    } else {
        Err(CliError::new("verification failed"))
    }
}
