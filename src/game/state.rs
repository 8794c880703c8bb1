//! Game state management.
//!
//! [`GameState`] is a derived cache: the authoritative record of a game is
//! its [`PersistentState`](crate::replay::PersistentState), and a state is
//! rebuilt from it by replay. Every mutation goes through
//! [`GameState::apply_entry`], whether it comes from a freshly validated
//! action or from a stored log.
//!
//! # Modes
//!
//! A state is either [`Live`] or [`Simulated`]. Only a live state can start
//! a simulation, and rule validation only ever sees simulated states, so a
//! rule cannot recursively spin up another copy-and-test.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::action::{EntryKind, LogEntry};
use crate::error::{EngineResult, InvariantFailure, RuleViolation};
use crate::game::{
    check_invariants, Board, Coord, Layer, Location, Owner, Piece, PieceFactory, PieceId,
    PieceRecord, PlayerId, TerrainKind, POOL_PREFIX,
};
use crate::replay::InitialConfig;

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for players.
    #[default]
    Lobby,
    /// Laying out terrain and citadels.
    Setup,
    /// Regular play.
    Active,
    /// A winner (or draw) has been decided.
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lobby => "lobby",
            Self::Setup => "setup",
            Self::Active => "active",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

mod sealed {
    /// Closes [`Mode`](super::Mode) to the two modes defined here.
    pub trait Sealed {}
    impl Sealed for super::Live {}
    impl Sealed for super::Simulated {}
}

/// Marker for whether a state is the real game or a hypothetical copy.
pub trait Mode: sealed::Sealed + Clone + Copy + fmt::Debug + Send + Sync + 'static {
    /// Whether mutations are speculative.
    const SIMULATED: bool;
}

/// The real game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Live;

/// A hypothetical copy used during validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Simulated;

impl Mode for Live {
    const SIMULATED: bool = false;
}

impl Mode for Simulated {
    const SIMULATED: bool = true;
}

/// Complete game state.
#[derive(Debug, Clone)]
pub struct GameState<M: Mode = Live> {
    /// The board.
    board: Board,
    /// Every piece in the game, wherever it is.
    pieces: BTreeMap<PieceId, Piece>,
    /// Seating order.
    players: Vec<PlayerId>,
    /// Index into `players` of whoever acts now.
    current: usize,
    /// Number of completed turns.
    turn_number: u32,
    /// Actions committed in the current turn.
    actions_this_turn: u32,
    /// Actions allowed per turn.
    actions_per_turn: u32,
    /// Lifecycle phase.
    phase: Phase,
    /// Off-board pieces per player.
    stashes: BTreeMap<PlayerId, Vec<PieceId>>,
    /// Neutral off-board pieces.
    pool: Vec<PieceId>,
    /// Captured or consumed pieces.
    graveyard: Vec<PieceId>,
    /// Entries applied to this state.
    ///
    /// A simulation starts with an empty log; `committed_entries` counts the
    /// entries its live parent had.
    log: Vec<LogEntry>,
    /// Entries that precede `log`.
    committed_entries: usize,
    /// Timestamp of the last real mutation.
    last_modified: Option<DateTime<Utc>>,
    mode: PhantomData<M>,
}

impl GameState<Live> {
    /// Build the starting state for an initial configuration.
    ///
    /// Stash pieces get ids `"{player}:{type}:{n}"` and pool pieces
    /// `"pool:{type}:{n}"`, so the same configuration always yields the
    /// same pieces.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the configuration names a piece type
    /// the factory does not know.
    pub fn from_initial(
        initial: &InitialConfig,
        factory: &dyn PieceFactory,
    ) -> Result<Self, InvariantFailure> {
        let mut state = Self::empty(initial.players.clone(), initial.phase);
        state.actions_per_turn = initial.setup.actions_per_turn.max(1);

        for player in &initial.players {
            let mut stash = Vec::new();
            for (type_name, &count) in &initial.setup.stash {
                let spec = factory.resolve(type_name)?;
                for n in 0..count {
                    let id = PieceId::new(format!("{player}:{type_name}:{n}"));
                    let piece = Piece::new(
                        id.clone(),
                        Owner::Player(player.clone()),
                        spec.clone(),
                        Location::Stash(player.clone()),
                    );
                    state.pieces.insert(id.clone(), piece);
                    stash.push(id);
                }
            }
            state.stashes.insert(player.clone(), stash);
        }

        for (type_name, &count) in &initial.pool {
            let spec = factory.resolve(type_name)?;
            for n in 0..count {
                let id = PieceId::new(format!("{POOL_PREFIX}:{type_name}:{n}"));
                let piece = Piece::new(id.clone(), Owner::Neutral, spec.clone(), Location::Pool);
                state.pieces.insert(id.clone(), piece);
                state.pool.push(id);
            }
        }

        Ok(state)
    }

    /// Copy this state into a simulation.
    ///
    /// The copy shares no mutable data with `self`. Its log starts empty so
    /// the copy costs time proportional to the board and pieces, not to the
    /// length of the game.
    #[must_use]
    pub fn simulate(&self) -> GameState<Simulated> {
        GameState {
            board: self.board.clone(),
            pieces: self.pieces.clone(),
            players: self.players.clone(),
            current: self.current,
            turn_number: self.turn_number,
            actions_this_turn: self.actions_this_turn,
            actions_per_turn: self.actions_per_turn,
            phase: self.phase,
            stashes: self.stashes.clone(),
            pool: self.pool.clone(),
            graveyard: self.graveyard.clone(),
            log: Vec::new(),
            committed_entries: self.committed_entries + self.log.len(),
            last_modified: self.last_modified,
            mode: PhantomData,
        }
    }

    /// Override the phase (phase changes live in the initial configuration).
    #[allow(dead_code)]
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Serialize a full snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Serialize a full snapshot with indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Build the serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            players: self.players.clone(),
            current_player: self.current,
            turn_number: self.turn_number,
            actions_this_turn: self.actions_this_turn,
            actions_per_turn: self.actions_per_turn,
            phase: self.phase,
            board: self
                .board
                .iter()
                .map(|(coord, cell)| {
                    let cell = CellSnapshot {
                        terrain: cell.terrain.clone(),
                        piece: cell.piece.clone(),
                    };
                    (coord, cell)
                })
                .collect(),
            pieces: self.pieces.values().map(Piece::record).collect(),
            stashes: self.stashes.clone(),
            pool: self.pool.clone(),
            graveyard: self.graveyard.clone(),
            log: self.log.clone(),
            last_modified: self.last_modified,
        }
    }

    /// Restore a state from a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid, a piece type is unknown, or
    /// the snapshot places a piece in zero or several locations.
    pub fn from_json(data: &str, factory: &dyn PieceFactory) -> EngineResult<Self> {
        let snapshot: StateSnapshot = serde_json::from_str(data)?;
        Ok(Self::from_snapshot(snapshot, factory)?)
    }

    /// Restore a state from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if a piece type is unknown or locations
    /// are inconsistent.
    pub fn from_snapshot(
        snapshot: StateSnapshot,
        factory: &dyn PieceFactory,
    ) -> Result<Self, InvariantFailure> {
        let mut records: BTreeMap<PieceId, PieceRecord> = snapshot
            .pieces
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        let mut state = Self::empty(snapshot.players, snapshot.phase);
        state.current = snapshot.current_player;
        state.turn_number = snapshot.turn_number;
        state.actions_this_turn = snapshot.actions_this_turn;
        state.actions_per_turn = snapshot.actions_per_turn.max(1);
        state.last_modified = snapshot.last_modified;

        let mut place = |state: &mut Self, id: &PieceId, location: Location| {
            let record = records.remove(id).ok_or_else(|| {
                if state.pieces.contains_key(id) {
                    InvariantFailure::InconsistentLocation {
                        piece: id.clone(),
                        reason: "listed in more than one location".to_string(),
                    }
                } else {
                    InvariantFailure::PieceNotFound(id.clone())
                }
            })?;
            let piece = factory.piece_from_record(&record, location)?;
            state.pieces.insert(id.clone(), piece);
            Ok::<(), InvariantFailure>(())
        };

        for (coord, cell) in snapshot.board {
            for (layer, slot) in [(Layer::Terrain, cell.terrain), (Layer::Piece, cell.piece)] {
                if let Some(id) = slot {
                    place(&mut state, &id, Location::Board(coord))?;
                    state.board.set(coord, layer, id);
                }
            }
        }
        for (player, stash) in snapshot.stashes {
            for id in &stash {
                place(&mut state, id, Location::Stash(player.clone()))?;
            }
            state.stashes.insert(player, stash);
        }
        for id in &snapshot.pool {
            place(&mut state, id, Location::Pool)?;
        }
        state.pool = snapshot.pool;
        for id in &snapshot.graveyard {
            place(&mut state, id, Location::Graveyard)?;
        }
        state.graveyard = snapshot.graveyard;

        if let Some(id) = records.into_keys().next() {
            return Err(InvariantFailure::InconsistentLocation {
                piece: id,
                reason: "not listed in any location".to_string(),
            });
        }

        state.log = snapshot.log;

        if let Some(failure) = check_invariants(&state).into_iter().next() {
            error!(%failure, "snapshot failed structural checks");
            return Err(failure);
        }
        Ok(state)
    }
}

impl GameState<Simulated> {
    /// Copy this simulation into a further, independent simulation.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }
}

impl<M: Mode> GameState<M> {
    fn empty(players: Vec<PlayerId>, phase: Phase) -> Self {
        Self {
            board: Board::new(),
            pieces: BTreeMap::new(),
            players,
            current: 0,
            turn_number: 0,
            actions_this_turn: 0,
            actions_per_turn: 1,
            phase,
            stashes: BTreeMap::new(),
            pool: Vec::new(),
            graveyard: Vec::new(),
            log: Vec::new(),
            committed_entries: 0,
            last_modified: None,
            mode: PhantomData,
        }
    }

    /// Whether this is a hypothetical copy.
    #[must_use]
    pub const fn is_simulation(&self) -> bool {
        M::SIMULATED
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Seating order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Index of the player to act.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The player to act, if any players are seated.
    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerId> {
        self.players.get(self.current)
    }

    /// Number of completed turns.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Actions already taken this turn.
    #[must_use]
    pub const fn actions_this_turn(&self) -> u32 {
        self.actions_this_turn
    }

    /// Actions allowed per turn.
    #[must_use]
    pub const fn actions_per_turn(&self) -> u32 {
        self.actions_per_turn
    }

    /// Look up a piece.
    #[must_use]
    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    /// Look up a piece that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantFailure::PieceNotFound`] when it does not.
    pub fn require_piece(&self, id: &PieceId) -> Result<&Piece, InvariantFailure> {
        self.pieces.get(id).ok_or_else(|| {
            error!(piece = %id, "piece missing from state");
            InvariantFailure::PieceNotFound(id.clone())
        })
    }

    /// Every piece, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// A player's stash.
    #[must_use]
    pub fn stash(&self, player: &PlayerId) -> &[PieceId] {
        self.stashes.get(player).map_or(&[], Vec::as_slice)
    }

    /// Every stash, keyed by player.
    #[must_use]
    pub const fn stashes(&self) -> &BTreeMap<PlayerId, Vec<PieceId>> {
        &self.stashes
    }

    /// The shared pool.
    #[must_use]
    pub fn pool(&self) -> &[PieceId] {
        &self.pool
    }

    /// The graveyard.
    #[must_use]
    pub fn graveyard(&self) -> &[PieceId] {
        &self.graveyard
    }

    /// Entries applied to this state (for a simulation: only its own).
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Total number of entries behind this state.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.committed_entries + self.log.len()
    }

    /// Timestamp of the last real mutation.
    #[must_use]
    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// The unit standing at a coordinate.
    #[must_use]
    pub fn unit_at(&self, coord: Coord) -> Option<&Piece> {
        self.board.piece_at(coord).and_then(|id| self.pieces.get(id))
    }

    /// Kind of terrain at a coordinate.
    #[must_use]
    pub fn terrain_kind_at(&self, coord: Coord) -> Option<TerrainKind> {
        self.board
            .terrain_at(coord)
            .and_then(|id| self.pieces.get(id))
            .and_then(|piece| piece.spec.terrain_kind())
    }

    /// First pool tile of a terrain kind, in pool order.
    #[must_use]
    pub fn pool_tile(&self, kind: TerrainKind) -> Option<&PieceId> {
        self.pool.iter().find(|id| {
            self.pieces
                .get(*id)
                .is_some_and(|piece| piece.spec.terrain_kind() == Some(kind))
        })
    }

    /// Coordinates of a player's on-board home-base pieces.
    #[must_use]
    pub fn citadels_of(&self, player: &PlayerId) -> Vec<Coord> {
        self.pieces
            .values()
            .filter(|piece| piece.spec.home_base && piece.owner.is(player))
            .filter_map(Piece::coord)
            .collect()
    }

    /// Check that each player's citadels share one terrain component.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::CitadelsDisconnected`] for the first player
    /// whose citadels are split.
    pub fn check_citadel_connectivity(&self) -> Result<(), RuleViolation> {
        for player in &self.players {
            if !self.board.is_connected(&self.citadels_of(player)) {
                return Err(RuleViolation::CitadelsDisconnected {
                    player: player.clone(),
                });
            }
        }
        Ok(())
    }

    /// Apply one log entry.
    ///
    /// The turn context (turn number, acting player) is taken from the
    /// entry. Side effects recorded in the entry (captures, casualties,
    /// pool tiles) are applied exactly as recorded.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the entry does not fit the state: a
    /// referenced piece is missing or not where the entry says, a target
    /// slot is taken, or a required field is absent. The state may be
    /// partially modified in that case and must be discarded.
    pub fn apply_entry(&mut self, entry: &LogEntry) -> Result<(), InvariantFailure> {
        let index = self.log_len();
        self.enter_turn(entry)?;

        let data = &entry.data;
        match entry.kind {
            EntryKind::Place => {
                let piece = entry.require_piece(index)?;
                let to = entry.require(index, "to", data.to.as_ref())?;
                self.expect_off_board(piece)?;
                self.relocate(piece, Location::Board(to))?;
            }
            EntryKind::Move => {
                let piece = entry.require_piece(index)?;
                let from = entry.require(index, "from", data.from.as_ref())?;
                let to = entry.require(index, "to", data.to.as_ref())?;
                self.expect_at(piece, from)?;
                if let Some(captured) = &data.captured {
                    self.expect_at(captured, to)?;
                    self.relocate(captured, Location::Graveyard)?;
                }
                self.relocate(piece, Location::Board(to))?;
            }
            EntryKind::RaiseTerrain => {
                let tile = entry.require(index, "tile", data.tile.as_ref())?;
                let to = entry.require(index, "to", data.to.as_ref())?;
                if self.require_piece(&tile)?.location != Location::Pool {
                    return Err(inconsistent(&tile, "raised tile is not in the pool"));
                }
                self.relocate(&tile, Location::Board(to))?;
            }
            EntryKind::ShiftTerrain => {
                let tile = entry.require(index, "tile", data.tile.as_ref())?;
                let from = entry.require(index, "from", data.from.as_ref())?;
                let to = entry.require(index, "to", data.to.as_ref())?;
                self.expect_at(&tile, from)?;
                self.relocate(&tile, Location::Board(to))?;
            }
            EntryKind::SinkTerrain => {
                let tile = entry.require(index, "tile", data.tile.as_ref())?;
                let from = entry.require(index, "from", data.from.as_ref())?;
                self.expect_at(&tile, from)?;
                if let Some(casualty) = &data.casualty {
                    self.expect_at(casualty, from)?;
                    self.relocate(casualty, Location::Graveyard)?;
                }
                self.relocate(&tile, Location::Pool)?;
            }
            EntryKind::EndTurn => self.advance_turn(),
        }

        if entry.kind != EntryKind::EndTurn {
            self.actions_this_turn += 1;
        }
        self.log.push(entry.clone());
        if !M::SIMULATED {
            self.last_modified = Some(entry.timestamp);
        }
        Ok(())
    }

    /// Adopt the turn context recorded in an entry.
    fn enter_turn(&mut self, entry: &LogEntry) -> Result<(), InvariantFailure> {
        let Some(index) = self.players.iter().position(|p| *p == entry.player) else {
            error!(player = %entry.player, "log entry names a player who is not seated");
            return Err(InvariantFailure::UnknownPlayer(entry.player.clone()));
        };
        if entry.turn_number != self.turn_number {
            self.actions_this_turn = 0;
        }
        self.turn_number = entry.turn_number;
        self.current = index;
        Ok(())
    }

    /// Pass the turn to the next seated player.
    fn advance_turn(&mut self) {
        if !self.players.is_empty() {
            self.current = (self.current + 1) % self.players.len();
        }
        self.turn_number += 1;
        self.actions_this_turn = 0;
    }

    fn expect_at(&self, id: &PieceId, coord: Coord) -> Result<(), InvariantFailure> {
        if self.require_piece(id)?.location == Location::Board(coord) {
            Ok(())
        } else {
            Err(inconsistent(id, &format!("expected at {coord}")))
        }
    }

    fn expect_off_board(&self, id: &PieceId) -> Result<(), InvariantFailure> {
        match self.require_piece(id)?.location {
            Location::Stash(_) | Location::Pool => Ok(()),
            Location::Board(_) | Location::Graveyard => {
                Err(inconsistent(id, "expected in a stash or the pool"))
            }
        }
    }

    /// Move a piece from wherever it is to `to`.
    fn relocate(&mut self, id: &PieceId, to: Location) -> Result<(), InvariantFailure> {
        self.detach(id)?;
        self.attach(id, to)
    }

    fn detach(&mut self, id: &PieceId) -> Result<(), InvariantFailure> {
        let piece = self.require_piece(id)?;
        let layer = piece.spec.class.layer();
        let removed = match piece.location.clone() {
            Location::Board(coord) => {
                if self.board.occupant(coord, layer) == Some(id) {
                    self.board.take(coord, layer).is_some()
                } else {
                    false
                }
            }
            Location::Stash(player) => self
                .stashes
                .get_mut(&player)
                .is_some_and(|stash| remove_id(stash, id)),
            Location::Pool => remove_id(&mut self.pool, id),
            Location::Graveyard => remove_id(&mut self.graveyard, id),
        };
        if removed {
            Ok(())
        } else {
            Err(inconsistent(id, "not found at its recorded location"))
        }
    }

    fn attach(&mut self, id: &PieceId, to: Location) -> Result<(), InvariantFailure> {
        let layer = self.require_piece(id)?.spec.class.layer();
        match &to {
            Location::Board(coord) => {
                if let Some(occupant) = self.board.occupant(*coord, layer) {
                    return Err(inconsistent(id, &format!("{coord} is held by {occupant}")));
                }
                self.board.set(*coord, layer, id.clone());
            }
            Location::Stash(player) => {
                self.stashes.entry(player.clone()).or_default().push(id.clone());
            }
            Location::Pool => self.pool.push(id.clone()),
            Location::Graveyard => self.graveyard.push(id.clone()),
        }
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.location = to;
        }
        Ok(())
    }
}

fn remove_id(list: &mut Vec<PieceId>, id: &PieceId) -> bool {
    match list.iter().position(|entry| entry == id) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

fn inconsistent(id: &PieceId, reason: &str) -> InvariantFailure {
    error!(piece = %id, reason, "inconsistent piece location");
    InvariantFailure::InconsistentLocation {
        piece: id.clone(),
        reason: reason.to_string(),
    }
}

/// Serialized cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Terrain tile id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<PieceId>,
    /// Unit id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<PieceId>,
}

/// Serialized form of a full [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Seating order.
    pub players: Vec<PlayerId>,
    /// Index of the player to act.
    pub current_player: usize,
    /// Completed turns.
    pub turn_number: u32,
    /// Actions taken this turn.
    pub actions_this_turn: u32,
    /// Actions allowed per turn.
    pub actions_per_turn: u32,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Occupied cells keyed by `"x,y"`.
    pub board: BTreeMap<Coord, CellSnapshot>,
    /// Every piece.
    pub pieces: Vec<PieceRecord>,
    /// Off-board pieces per player.
    pub stashes: BTreeMap<PlayerId, Vec<PieceId>>,
    /// Shared pool.
    pub pool: Vec<PieceId>,
    /// Graveyard.
    pub graveyard: Vec<PieceId>,
    /// Action log.
    pub log: Vec<LogEntry>,
    /// Timestamp of the last mutation.
    pub last_modified: Option<DateTime<Utc>>,
}
