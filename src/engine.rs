//! The engine façade.
//!
//! An [`Engine`] owns one game's [`PersistentState`] and everything needed
//! to judge actions against it. Reads go through a cached replay of the
//! document; every change to the document invalidates the cache.
//!
//! # Flow
//!
//! ```text
//! check_action ──► simulate ──► plan ──► fork + apply ──► validate
//!                                                            │
//! execute_action ◄───────────────────────────────────────────┘
//!      │
//!      └─► append to log ──► invalidate ──► variant hooks
//! ```

mod cache;
mod validator;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

pub use cache::DerivedState;
pub use validator::{check, valid_targets};

use crate::action::{ActionKind, LogEntry, Target};
use crate::clock::{Clock, SystemClock};
use crate::error::{EngineResult, InvariantFailure, RuleViolation};
use crate::game::{Coord, GameState, Phase, PieceFactory, PieceId};
use crate::replay::{InitialConfig, PersistentState};
use crate::variant::{self, GameEnd, Variant};

/// Tunable engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cells added around the board's extent when enumerating targets.
    pub target_margin: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { target_margin: 2 }
    }
}

/// Result of a committed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// The entry appended to the log.
    pub entry: LogEntry,
    /// Set when this commit ended the game.
    pub game_end: Option<GameEnd>,
}

/// Rules engine for one game.
pub struct Engine {
    persistent: PersistentState,
    factory: Arc<dyn PieceFactory>,
    variant: Arc<dyn Variant>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    cache: DerivedState,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("variant", &self.variant.name())
            .field("phase", &self.persistent.initial.phase)
            .field("revision", &self.persistent.revision())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Start a new game with an empty log.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the configuration names an unknown
    /// piece type or variant.
    pub fn new(initial: InitialConfig, factory: Arc<dyn PieceFactory>) -> EngineResult<Self> {
        Self::from_persistent(PersistentState::new(initial), factory)
    }

    /// Load a game from its persistent document.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the configuration names an unknown
    /// piece type or variant.
    pub fn from_persistent(
        persistent: PersistentState,
        factory: Arc<dyn PieceFactory>,
    ) -> EngineResult<Self> {
        persistent.initial.validate(&*factory)?;
        let variant = resolve_variant(&persistent.initial)?;
        Ok(Self {
            persistent,
            factory,
            variant,
            config: EngineConfig::default(),
            clock: Arc::new(SystemClock),
            cache: DerivedState::new(),
        })
    }

    /// Use a different time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use different engine parameters.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The persistent document.
    #[must_use]
    pub const fn persistent(&self) -> &PersistentState {
        &self.persistent
    }

    /// Give up the engine, keeping the document.
    #[must_use]
    pub fn into_persistent(self) -> PersistentState {
        self.persistent
    }

    /// The active variant.
    #[must_use]
    pub fn variant(&self) -> &dyn Variant {
        &*self.variant
    }

    /// Engine parameters.
    #[must_use]
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// The current game state, replayed from the document if needed.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the log cannot be replayed.
    pub fn state(&mut self) -> EngineResult<&GameState> {
        Ok(self.cache.get_or_derive(&self.persistent, &*self.factory)?)
    }

    /// Judge an action without performing it.
    ///
    /// Nothing is mutated, whatever the outcome. On success, returns the
    /// entry that committing the action would append.
    ///
    /// # Errors
    ///
    /// Returns a rule violation if the action is illegal, or an invariant
    /// failure if the piece does not exist.
    #[instrument(skip(self, piece, target), fields(piece = %piece, target = %target))]
    pub fn check_action(
        &mut self,
        piece: &PieceId,
        action: ActionKind,
        target: Target,
    ) -> EngineResult<LogEntry> {
        let now = self.clock.now();
        let state = self.cache.get_or_derive(&self.persistent, &*self.factory)?;
        let result = check(state, &*self.variant, piece, action, target, now);
        if let Err(err) = &result {
            debug!(%err, "action rejected");
        }
        result
    }

    /// Validate and commit an action.
    ///
    /// # Errors
    ///
    /// Returns a rule violation if the action is illegal, or an invariant
    /// failure if the piece does not exist. Nothing changes on error.
    pub fn execute_action(
        &mut self,
        piece: &PieceId,
        action: ActionKind,
        target: Target,
    ) -> EngineResult<Committed> {
        let entry = self.check_action(piece, action, target)?;
        self.commit(entry)
    }

    /// Place a piece from a stash or the pool.
    ///
    /// # Errors
    ///
    /// See [`execute_action`](Self::execute_action).
    pub fn place_piece(&mut self, piece: &PieceId, at: Coord) -> EngineResult<Committed> {
        self.execute_action(piece, ActionKind::Place, Target::At(at))
    }

    /// End the current player's turn.
    ///
    /// # Errors
    ///
    /// Returns a rule violation outside the setup and play phases or when
    /// no players are seated.
    #[instrument(skip(self))]
    pub fn end_turn(&mut self) -> EngineResult<Committed> {
        let now = self.clock.now();
        let state = self.cache.get_or_derive(&self.persistent, &*self.factory)?;
        match state.phase() {
            Phase::Finished => return Err(RuleViolation::GameOver.into()),
            Phase::Lobby => return Err(RuleViolation::WrongPhase(Phase::Lobby).into()),
            Phase::Setup | Phase::Active => {}
        }
        let player = state.current_player().ok_or(RuleViolation::NoPlayers)?;
        let entry = LogEntry::end_turn(player.clone(), state.turn_number(), now);
        self.commit(entry)
    }

    /// Append a validated entry and run the variant hooks.
    ///
    /// An entry whose replay fails, or leaves the state inconsistent, is
    /// removed again and the failure returned.
    fn commit(&mut self, entry: LogEntry) -> EngineResult<Committed> {
        let previous_modified = self.persistent.last_modified;
        self.persistent.append(entry.clone());
        self.cache.invalidate();

        let state = match self.cache.get_or_derive(&self.persistent, &*self.factory) {
            Ok(state) => state,
            Err(failure) => {
                warn!(%failure, "committed entry does not replay, rolling back");
                self.persistent.actions.pop();
                self.persistent.last_modified = previous_modified;
                self.cache.invalidate();
                return Err(failure.into());
            }
        };

        let game_end = self
            .variant
            .on_action(&entry, state)
            .or_else(|| self.variant.check_end(state));
        debug!(kind = ?entry.kind, revision = self.persistent.revision(), "committed");

        if let Some(end) = &game_end {
            info!(%end, "game over");
            self.set_phase(Phase::Finished);
        }
        Ok(Committed { entry, game_end })
    }

    fn set_phase(&mut self, phase: Phase) {
        self.persistent.initial.phase = phase;
        self.persistent.last_modified = Some(self.clock.now());
        self.cache.invalidate();
    }

    /// Every target for which an action would be accepted.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the piece does not exist.
    #[instrument(skip(self, piece), fields(piece = %piece))]
    pub fn valid_targets(&mut self, piece: &PieceId, action: ActionKind) -> EngineResult<Vec<Target>> {
        let now = self.clock.now();
        let margin = self.config.target_margin;
        let state = self.cache.get_or_derive(&self.persistent, &*self.factory)?;
        valid_targets(state, &*self.variant, piece, action, margin, now)
    }

    /// Every supported action of a piece that has at least one valid
    /// target, in the order the piece declares them.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the piece does not exist.
    pub fn valid_actions_for_piece(
        &mut self,
        piece: &PieceId,
    ) -> EngineResult<Vec<(ActionKind, Vec<Target>)>> {
        let actions = self.state()?.require_piece(piece)?.spec.actions.clone();
        let mut found = Vec::new();
        for action in actions {
            let targets = self.valid_targets(piece, action)?;
            if !targets.is_empty() {
                found.push((action, targets));
            }
        }
        Ok(found)
    }

    /// Ask the variant whether the game has ended.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the log cannot be replayed.
    pub fn check_game_end(&mut self) -> EngineResult<Option<GameEnd>> {
        let state = self.cache.get_or_derive(&self.persistent, &*self.factory)?;
        Ok(self.variant.check_end(state))
    }

    /// Check that every player's citadels share one terrain component.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::CitadelsDisconnected`] for the first player
    /// whose citadels are split.
    pub fn validate_citadel_connectivity(&mut self) -> EngineResult<()> {
        Ok(self.state()?.check_citadel_connectivity()?)
    }

    /// Move from the lobby into setup.
    ///
    /// # Errors
    ///
    /// Returns a rule violation outside the lobby or with no players.
    #[instrument(skip(self))]
    pub fn open_setup(&mut self) -> EngineResult<()> {
        let phase = self.persistent.initial.phase;
        if phase != Phase::Lobby {
            return Err(RuleViolation::WrongPhase(phase).into());
        }
        if self.persistent.initial.players.is_empty() {
            return Err(RuleViolation::NoPlayers.into());
        }
        self.set_phase(Phase::Setup);
        info!("setup opened");
        Ok(())
    }

    /// Move from setup into play.
    ///
    /// # Errors
    ///
    /// Returns a rule violation outside setup, when a player has no
    /// citadel on the board, or when a player's citadels are split.
    #[instrument(skip(self))]
    pub fn begin_play(&mut self) -> EngineResult<()> {
        let phase = self.persistent.initial.phase;
        if phase != Phase::Setup {
            return Err(RuleViolation::WrongPhase(phase).into());
        }
        let state = self.cache.get_or_derive(&self.persistent, &*self.factory)?;
        if let Some(player) = state
            .players()
            .iter()
            .find(|player| state.citadels_of(player).is_empty())
        {
            return Err(RuleViolation::MissingCitadel {
                player: player.clone(),
            }
            .into());
        }
        state.check_citadel_connectivity()?;
        self.set_phase(Phase::Active);
        info!("play started");
        Ok(())
    }

    /// Remove the last committed entry.
    ///
    /// Undoing out of a finished game resumes play.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::EmptyLog`] when there is nothing to undo.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> EngineResult<LogEntry> {
        let Some(entry) = self.persistent.actions.last().cloned() else {
            return Err(RuleViolation::EmptyLog.into());
        };
        self.rewind_to(self.persistent.revision() - 1)?;
        Ok(entry)
    }

    /// Keep only the first `len` entries.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the shortened log cannot be replayed.
    pub fn rewind_to(&mut self, len: usize) -> EngineResult<()> {
        if len >= self.persistent.revision() {
            return Ok(());
        }
        let now = self.clock.now();
        self.persistent.truncate(len, now);
        if self.persistent.initial.phase == Phase::Finished {
            self.persistent.initial.phase = Phase::Active;
        }
        self.cache.invalidate();
        self.state()?;
        debug!(revision = len, "rewound");
        Ok(())
    }

    /// Adopt a newer document, typically fetched from shared storage.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the document names unknown types or
    /// variants. The engine keeps its previous document in that case.
    pub fn sync(&mut self, persistent: PersistentState) -> EngineResult<()> {
        persistent.initial.validate(&*self.factory)?;
        self.variant = resolve_variant(&persistent.initial)?;
        self.persistent = persistent;
        self.cache.invalidate();
        Ok(())
    }
}

fn resolve_variant(initial: &InitialConfig) -> Result<Arc<dyn Variant>, InvariantFailure> {
    variant::by_name(&initial.variant)
        .ok_or_else(|| InvariantFailure::UnknownVariant(initial.variant.clone()))
}
