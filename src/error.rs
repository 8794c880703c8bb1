//! Error types for the rules engine.
//!
//! Two classes of failure exist:
//! - [`RuleViolation`]: the proposed action breaks a game rule. Expected,
//!   user-correctable, carries a human-readable reason.
//! - [`InvariantFailure`]: the engine found itself in a state that a
//!   consistent log can never produce. Callers must not swallow these.

use derive_more::{Display, Error, From};

use crate::action::ActionKind;
use crate::game::{Coord, Phase, PieceId, PlayerId};

/// A proposed action was rejected by the game rules.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RuleViolation {
    /// The action is not allowed in the current phase.
    #[display("Action not allowed during the {_0} phase")]
    WrongPhase(#[error(not(source))] Phase),

    /// The game is already finished.
    #[display("Game is already over")]
    GameOver,

    /// The acting piece belongs to someone other than the current player.
    #[display("It is not {player}'s turn")]
    NotYourTurn {
        /// Owner of the piece that tried to act.
        player: PlayerId,
    },

    /// The current player has used every action allowed this turn.
    #[display("No actions left this turn (limit {limit})")]
    ActionLimitReached {
        /// Actions allowed per turn.
        limit: u32,
    },

    /// The piece does not expose the requested action.
    #[display("Piece {piece} cannot perform {action}")]
    UnsupportedAction {
        /// Acting piece.
        piece: PieceId,
        /// Requested action.
        action: ActionKind,
    },

    /// The target has the wrong shape for the action.
    #[display("{action} needs a {expected} target")]
    WrongTargetShape {
        /// Requested action.
        action: ActionKind,
        /// Description of the expected shape.
        expected: &'static str,
    },

    /// The piece must be on the board to perform this action.
    #[display("Piece {_0} is not on the board")]
    NotOnBoard(#[error(not(source))] PieceId),

    /// The piece must be in the acting player's stash or the shared pool.
    #[display("Piece {_0} is not available for placement")]
    NotInReserve(#[error(not(source))] PieceId),

    /// The active ruleset does not allow this piece type to be placed now.
    #[display("{piece_type} may not be placed during the {phase} phase")]
    NotAvailable {
        /// Piece type name.
        piece_type: String,
        /// Current phase.
        phase: Phase,
    },

    /// A piece cannot target its own coordinate.
    #[display("Piece is already at {_0}")]
    SameCoordinate(#[error(not(source))] Coord),

    /// The relevant layer at the target is already taken.
    #[display("{_0} is already occupied")]
    Occupied(#[error(not(source))] Coord),

    /// The target has no terrain to stand on.
    #[display("{_0} has no terrain")]
    NoTerrain(#[error(not(source))] Coord),

    /// The target already carries terrain.
    #[display("{_0} already has terrain")]
    TerrainPresent(#[error(not(source))] Coord),

    /// The target is water and the piece cannot enter water.
    #[display("{_0} is water")]
    Water(#[error(not(source))] Coord),

    /// The target holds a piece of the same owner.
    #[display("{_0} holds a friendly piece")]
    FriendlyOccupant(#[error(not(source))] Coord),

    /// The target holds an enemy piece and the action cannot capture.
    #[display("{_0} is occupied and this action cannot capture")]
    CaptureNotAllowed(#[error(not(source))] Coord),

    /// The target is outside the piece's movement pattern.
    #[display("{target} is out of reach from {from}")]
    OutOfReach {
        /// Acting piece coordinate.
        from: Coord,
        /// Requested target.
        target: Coord,
    },

    /// Something stands between the piece and its target.
    #[display("Path from {from} to {target} is blocked at {blocked}")]
    PathBlocked {
        /// Acting piece coordinate.
        from: Coord,
        /// Requested target.
        target: Coord,
        /// First blocking cell.
        blocked: Coord,
    },

    /// The shared pool has no tile of the requested kind.
    #[display("The shared pool has no {_0} tiles left")]
    PoolExhausted(#[error(not(source))] String),

    /// The action would split a player's citadels apart.
    #[display("{player}'s citadels would no longer be connected")]
    CitadelsDisconnected {
        /// Player whose citadels would be split.
        player: PlayerId,
    },

    /// A player tried to start play without a citadel on the board.
    #[display("{player} has no citadel on the board")]
    MissingCitadel {
        /// Player lacking a citadel.
        player: PlayerId,
    },

    /// Nothing to undo.
    #[display("The action log is empty")]
    EmptyLog,

    /// No players are seated.
    #[display("The game has no players")]
    NoPlayers,
}

impl RuleViolation {
    /// Human-readable reason, suitable for showing to a player.
    #[must_use]
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// The engine reached a state that a consistent log cannot produce.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum InvariantFailure {
    /// A piece id was referenced but does not exist in the state.
    #[display("Piece {_0} not found")]
    PieceNotFound(#[error(not(source))] PieceId),

    /// The piece factory does not know a type name.
    #[display("Unknown piece type {_0:?}")]
    UnknownPieceType(#[error(not(source))] String),

    /// A player id was referenced but is not part of the game.
    #[display("Unknown player {_0}")]
    UnknownPlayer(#[error(not(source))] PlayerId),

    /// A log entry is missing data its type requires.
    #[display("Malformed log entry #{index}: {reason}")]
    MalformedEntry {
        /// Position of the entry in the log.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Board, stashes, pool and graveyard disagree about a piece.
    #[display("Inconsistent location for {piece}: {reason}")]
    InconsistentLocation {
        /// Affected piece.
        piece: PieceId,
        /// What is inconsistent.
        reason: String,
    },

    /// A seat name cannot be used to derive piece ids.
    #[display("Invalid player name {_0:?}")]
    InvalidPlayerName(#[error(not(source))] String),

    /// The configuration names a variant that does not exist.
    #[display("Unknown variant {_0:?}")]
    UnknownVariant(#[error(not(source))] String),

    /// The current-player index does not point at a seated player.
    #[display("Current player #{index} is out of range for {seated} players")]
    CurrentPlayerOutOfRange {
        /// Stored index.
        index: usize,
        /// Number of seated players.
        seated: usize,
    },
}

/// Any error the engine can report.
#[derive(Debug, Display, Error, From)]
pub enum EngineError {
    /// A game rule rejected the action.
    #[display("Rule violation: {_0}")]
    Rule(RuleViolation),
    /// The engine state or log is corrupt.
    #[display("Invariant failure: {_0}")]
    Invariant(InvariantFailure),
    /// A JSON document could not be read or written.
    #[display("JSON error: {_0}")]
    Json(serde_json::Error),
    /// A game file could not be read or written.
    #[display("I/O error: {_0}")]
    Io(std::io::Error),
}

impl EngineError {
    /// Whether this error is a user-correctable rule violation.
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        matches!(self, Self::Rule(_))
    }

    /// The rule violation, if this is one.
    #[must_use]
    pub const fn as_rule_violation(&self) -> Option<&RuleViolation> {
        match self {
            Self::Rule(violation) => Some(violation),
            _ => None,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
