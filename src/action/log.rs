//! Action-log entries.
//!
//! An entry records exactly what changed, with every side effect already
//! resolved (captured piece, pool tile used, casualty of a sunk tile).
//! Replaying an entry therefore never consults the rules again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::error::InvariantFailure;
use crate::game::{Coord, PieceId, PlayerId};

/// What kind of mutation an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// A piece left a stash or the pool and entered the board.
    Place,
    /// A piece moved, possibly capturing.
    Move,
    /// A land tile left the pool for the board.
    RaiseTerrain,
    /// A terrain tile moved between cells.
    ShiftTerrain,
    /// A terrain tile returned to the pool.
    SinkTerrain,
    /// The turn passed to the next player.
    EndTurn,
}

/// Type-specific payload. Fields a type does not use are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryData {
    /// The action that produced the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    /// Source cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Coord>,
    /// Destination cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Coord>,
    /// Piece sent to the graveyard by a capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceId>,
    /// Terrain tile that was raised, shifted or sunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<PieceId>,
    /// Piece that went down with a sunk tile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casualty: Option<PieceId>,
}

/// One immutable record in the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Mutation type.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Acting piece (`None` for end of turn).
    pub piece_id: Option<PieceId>,
    /// Type-specific payload.
    pub data: EntryData,
    /// Turn the entry belongs to.
    pub turn_number: u32,
    /// Acting player.
    pub player: PlayerId,
    /// When the entry was committed.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// An end-of-turn entry.
    #[must_use]
    pub fn end_turn(player: PlayerId, turn_number: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: EntryKind::EndTurn,
            piece_id: None,
            data: EntryData::default(),
            turn_number,
            player,
            timestamp,
        }
    }

    /// The acting piece, required for every type but end of turn.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantFailure::MalformedEntry`] when the id is missing.
    pub fn require_piece(&self, index: usize) -> Result<&PieceId, InvariantFailure> {
        self.piece_id.as_ref().ok_or_else(|| malformed(index, "missing pieceId"))
    }

    /// A required payload field.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantFailure::MalformedEntry`] naming the missing field.
    pub fn require<T: Clone>(
        &self,
        index: usize,
        field: &'static str,
        value: Option<&T>,
    ) -> Result<T, InvariantFailure> {
        value
            .cloned()
            .ok_or_else(|| malformed(index, &format!("missing data.{field}")))
    }
}

fn malformed(index: usize, reason: &str) -> InvariantFailure {
    tracing::error!(index, reason, "malformed log entry");
    InvariantFailure::MalformedEntry {
        index,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_wire_shape() {
        let entry = LogEntry {
            kind: EntryKind::Move,
            piece_id: Some(PieceId::from("alice:lancer:0")),
            data: EntryData {
                action: Some(ActionKind::Slide),
                from: Some(Coord::new(0, 0)),
                to: Some(Coord::new(2, 0)),
                captured: Some(PieceId::from("bob:guard:0")),
                ..EntryData::default()
            },
            turn_number: 3,
            player: PlayerId::from("alice"),
            timestamp: stamp(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["pieceId"], "alice:lancer:0");
        assert_eq!(json["data"]["from"], "0,0");
        assert_eq!(json["data"]["to"], "2,0");
        assert_eq!(json["data"]["captured"], "bob:guard:0");
        assert!(json["data"].get("tile").is_none());
        assert_eq!(json["turnNumber"], 3);
        assert_eq!(json["player"], "alice");

        let back: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_end_turn_has_null_piece() {
        let entry = LogEntry::end_turn(PlayerId::from("bob"), 7, stamp());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "endTurn");
        assert!(json["pieceId"].is_null());
        assert_eq!(json["data"], serde_json::json!({}));
    }

    #[test]
    fn test_require_reports_missing_field() {
        let entry = LogEntry::end_turn(PlayerId::from("bob"), 0, stamp());
        assert!(entry.require_piece(4).is_err());
        let err = entry.require(4, "to", entry.data.to.as_ref()).unwrap_err();
        assert_eq!(
            err,
            InvariantFailure::MalformedEntry {
                index: 4,
                reason: "missing data.to".to_string()
            }
        );
    }
}
