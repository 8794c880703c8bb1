//! CLI command implementations for Citadel.

pub(crate) mod inspect;
pub(crate) mod lifecycle;
pub(crate) mod play;

mod output;

use citadel::{Engine, EngineError, PersistentState, PieceCatalog};
use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Output format for inspection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Rule(violation) => Self::new(violation.reason()),
            other => Self::new(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Open the game stored at `path` with the standard piece catalogue.
fn load_engine(path: &Path) -> Result<Engine, CliError> {
    let factory = Arc::new(PieceCatalog::standard());
    let persistent = PersistentState::load(path, &*factory)
        .map_err(|e| CliError::new(format!("Failed to load game {}: {e}", path.display())))?;
    Ok(Engine::from_persistent(persistent, factory)?)
}

/// Write the engine's document back to `path`.
fn save_engine(engine: &Engine, path: &Path) -> Result<(), CliError> {
    engine
        .persistent()
        .save(path)
        .map_err(|e| CliError::new(format!("Failed to save game {}: {e}", path.display())))
}
