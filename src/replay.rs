//! Persistent state and replay.
//!
//! Only a [`PersistentState`] is ever stored: the initial configuration
//! plus the append-only action log. Everything else is derived by folding
//! the log over a fresh state seeded from the configuration.
//!
//! # Time Travel
//!
//! - **Any point**: [`state_at`] replays the first `n` entries
//! - **Undo**: truncate the log and replay, never reverse-mutate

mod render;

pub use render::render_ascii;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::action::LogEntry;
use crate::error::{EngineResult, InvariantFailure};
use crate::game::{
    check_invariants, kinds, GameState, Phase, PieceFactory, PlayerId, POOL_PREFIX,
};
use crate::variant::{self, DEFAULT_VARIANT};

/// Per-player starting material and turn allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetupParams {
    /// Pieces each player starts with, by type.
    pub stash: BTreeMap<String, u32>,
    /// Actions each player may take per turn.
    pub actions_per_turn: u32,
}

impl Default for SetupParams {
    fn default() -> Self {
        let stash = [
            (kinds::CITADEL, 2),
            (kinds::LANCER, 2),
            (kinds::GUARD, 3),
            (kinds::SKIFF, 1),
            (kinds::BUILDER, 1),
        ]
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
        Self {
            stash,
            actions_per_turn: 1,
        }
    }
}

/// Everything needed to seed a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialConfig {
    /// Seating order.
    pub players: Vec<PlayerId>,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Rule variant name.
    pub variant: String,
    /// Starting stashes and turn allowance.
    pub setup: SetupParams,
    /// Shared pool contents, by type.
    pub pool: BTreeMap<String, u32>,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            phase: Phase::Lobby,
            variant: DEFAULT_VARIANT.to_string(),
            setup: SetupParams::default(),
            pool: BTreeMap::from([(kinds::LAND.to_string(), 24), (kinds::WATER.to_string(), 6)]),
        }
    }
}

impl InitialConfig {
    /// Check seat names, every type and the variant name.
    ///
    /// Seat names become piece-id prefixes, so they must be unique, free of
    /// `:` and distinct from the shared pool's prefix.
    ///
    /// # Errors
    ///
    /// Returns the first invalid seat name, unknown piece type or variant.
    pub fn validate(&self, factory: &dyn PieceFactory) -> Result<(), InvariantFailure> {
        for (seat, player) in self.players.iter().enumerate() {
            let name = player.as_str();
            if name.is_empty()
                || name.contains(':')
                || name == POOL_PREFIX
                || self.players[..seat].contains(player)
            {
                error!(player = name, "configuration has an unusable seat name");
                return Err(InvariantFailure::InvalidPlayerName(name.to_string()));
            }
        }
        for name in self.setup.stash.keys().chain(self.pool.keys()) {
            factory.resolve(name)?;
        }
        if variant::by_name(&self.variant).is_none() {
            error!(variant = %self.variant, "configuration names an unknown variant");
            return Err(InvariantFailure::UnknownVariant(self.variant.clone()));
        }
        Ok(())
    }
}

/// The unit of storage: initial configuration plus action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentState {
    /// Seed configuration.
    pub initial: InitialConfig,
    /// Committed entries, oldest first.
    pub actions: Vec<LogEntry>,
    /// Time of the last change to this document.
    pub last_modified: Option<DateTime<Utc>>,
}

impl PersistentState {
    /// A new game with an empty log.
    #[must_use]
    pub fn new(initial: InitialConfig) -> Self {
        Self {
            initial,
            actions: Vec::new(),
            last_modified: None,
        }
    }

    /// Number of committed entries; grows by one per commit.
    ///
    /// Callers storing the document elsewhere can use it as an optimistic
    /// concurrency token.
    #[must_use]
    pub fn revision(&self) -> usize {
        self.actions.len()
    }

    /// Append a committed entry.
    pub fn append(&mut self, entry: LogEntry) {
        self.last_modified = Some(entry.timestamp);
        self.actions.push(entry);
    }

    /// Drop every entry after the first `len`.
    pub fn truncate(&mut self, len: usize, now: DateTime<Utc>) {
        self.actions.truncate(len);
        self.last_modified = Some(now);
    }

    /// Parse and check a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or names an unknown piece
    /// type or variant.
    pub fn from_json(data: &str, factory: &dyn PieceFactory) -> EngineResult<Self> {
        let persistent: Self = serde_json::from_str(data)?;
        persistent.initial.validate(factory)?;
        Ok(persistent)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a
    /// valid document.
    pub fn load(path: &Path, factory: &dyn PieceFactory) -> EngineResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data, factory)
    }

    /// Save the document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Rebuild the full state from a persistent document.
///
/// # Errors
///
/// Returns an invariant failure if the log does not fit the configuration.
pub fn to_full_state(
    persistent: &PersistentState,
    factory: &dyn PieceFactory,
) -> Result<GameState, InvariantFailure> {
    state_at(persistent, factory, persistent.actions.len())
}

/// Rebuild the state after the first `n` entries (clamped to the log).
///
/// Turn context comes from the entries themselves. A piece the log refers
/// to but the state does not hold aborts the replay, and so does a
/// replayed state that breaks a structural invariant.
///
/// # Errors
///
/// Returns an invariant failure if an entry cannot be applied or the
/// result is structurally inconsistent.
#[instrument(skip_all, fields(entries = n.min(persistent.actions.len())))]
pub fn state_at(
    persistent: &PersistentState,
    factory: &dyn PieceFactory,
    n: usize,
) -> Result<GameState, InvariantFailure> {
    let state = fold(persistent, factory, n)?;
    if let Some(failure) = check_invariants(&state).into_iter().next() {
        error!(%failure, "replayed state is inconsistent");
        return Err(failure);
    }
    Ok(state)
}

/// Apply the first `n` entries without judging the result.
fn fold(
    persistent: &PersistentState,
    factory: &dyn PieceFactory,
    n: usize,
) -> Result<GameState, InvariantFailure> {
    let mut state = GameState::from_initial(&persistent.initial, factory)?;
    for (index, entry) in persistent.actions.iter().take(n).enumerate() {
        if let Err(failure) = state.apply_entry(entry) {
            error!(index, %failure, "replay aborted");
            return Err(failure);
        }
    }
    debug!(log_len = state.log_len(), "replayed");
    Ok(state)
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Entries replayed.
    pub entries: usize,
    /// Whether two replays serialized identically.
    pub deterministic: bool,
    /// Structural problems in the replayed state.
    pub failures: Vec<InvariantFailure>,
}

impl VerifyReport {
    /// Whether the document passed every check.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.deterministic && self.failures.is_empty()
    }
}

/// Replay a document twice and check the result.
///
/// Unlike [`to_full_state`], structural problems are collected into the
/// report instead of aborting.
///
/// # Errors
///
/// Returns an error if the log cannot be replayed at all.
pub fn verify(persistent: &PersistentState, factory: &dyn PieceFactory) -> EngineResult<VerifyReport> {
    let n = persistent.actions.len();
    let first = fold(persistent, factory, n)?;
    let second = fold(persistent, factory, n)?;
    Ok(VerifyReport {
        entries: persistent.actions.len(),
        deterministic: first.to_json()? == second.to_json()?,
        failures: check_invariants(&first),
    })
}
