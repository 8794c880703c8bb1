//! Action descriptors and targets.

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::game::Coord;

/// Which base rules an action inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFamily {
    /// Bring an off-board piece onto the board.
    Place,
    /// Move an on-board piece.
    Move,
    /// Edit terrain around an on-board piece.
    Terrain,
}

/// Shape of the target an action expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// A single coordinate.
    Cell,
    /// A source and a destination coordinate.
    Transfer,
}

/// Every action a piece can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Place from stash or pool.
    #[display("place")]
    Place,
    /// Move to any of the eight neighbours, capturing.
    #[display("step")]
    Step,
    /// Move any distance along a row or column over supported cells, capturing.
    #[display("slide")]
    Slide,
    /// Move to an orthogonal neighbour, water allowed, no capture.
    #[display("paddle")]
    Paddle,
    /// Move to an orthogonal neighbour, no capture.
    #[display("walk")]
    Walk,
    /// Take a land tile from the pool and lay it next to the piece.
    #[display("raiseTerrain")]
    RaiseTerrain,
    /// Move a neighbouring terrain tile to another neighbouring cell.
    #[display("shiftTerrain")]
    ShiftTerrain,
    /// Return a neighbouring (or the piece's own) terrain tile to the pool.
    #[display("sinkTerrain")]
    SinkTerrain,
}

impl ActionKind {
    /// Every action kind, in declaration order.
    pub const ALL: [ActionKind; 8] = [
        Self::Place,
        Self::Step,
        Self::Slide,
        Self::Paddle,
        Self::Walk,
        Self::RaiseTerrain,
        Self::ShiftTerrain,
        Self::SinkTerrain,
    ];

    /// Base rule family.
    #[must_use]
    pub const fn family(self) -> ActionFamily {
        match self {
            Self::Place => ActionFamily::Place,
            Self::Step | Self::Slide | Self::Paddle | Self::Walk => ActionFamily::Move,
            Self::RaiseTerrain | Self::ShiftTerrain | Self::SinkTerrain => ActionFamily::Terrain,
        }
    }

    /// Whether moving onto an enemy piece captures it.
    #[must_use]
    pub const fn captures(self) -> bool {
        matches!(self, Self::Step | Self::Slide)
    }

    /// Expected target shape.
    #[must_use]
    pub const fn target_shape(self) -> TargetShape {
        match self {
            Self::ShiftTerrain => TargetShape::Transfer,
            _ => TargetShape::Cell,
        }
    }
}

/// An action name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unknown action {input:?}")]
pub struct ParseActionError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for ActionKind {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseActionError {
                input: s.to_string(),
            })
    }
}

/// Where an action is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    /// A single cell.
    At(Coord),
    /// From one cell to another.
    Transfer {
        /// Source cell.
        from: Coord,
        /// Destination cell.
        to: Coord,
    },
}

impl Target {
    /// Shape of this target.
    #[must_use]
    pub const fn shape(self) -> TargetShape {
        match self {
            Self::At(_) => TargetShape::Cell,
            Self::Transfer { .. } => TargetShape::Transfer,
        }
    }

    /// The destination cell.
    #[must_use]
    pub const fn destination(self) -> Coord {
        match self {
            Self::At(coord) | Self::Transfer { to: coord, .. } => coord,
        }
    }
}

impl From<Coord> for Target {
    fn from(coord: Coord) -> Self {
        Self::At(coord)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(coord) => write!(f, "{coord}"),
            Self::Transfer { from, to } => write!(f, "{from}>{to}"),
        }
    }
}

/// A target could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("invalid target {input:?}, expected \"x,y\" or \"x,y>x,y\"")]
pub struct ParseTargetError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |_| ParseTargetError {
            input: s.to_string(),
        };
        match s.split_once('>') {
            Some((from, to)) => Ok(Self::Transfer {
                from: from.parse().map_err(err)?,
                to: to.parse().map_err(err)?,
            }),
            None => Ok(Self::At(s.parse().map_err(err)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_descriptors() {
        assert_eq!(ActionKind::Place.family(), ActionFamily::Place);
        assert_eq!(ActionKind::Slide.family(), ActionFamily::Move);
        assert_eq!(ActionKind::SinkTerrain.family(), ActionFamily::Terrain);

        assert!(ActionKind::Step.captures());
        assert!(ActionKind::Slide.captures());
        assert!(!ActionKind::Paddle.captures());
        assert!(!ActionKind::Walk.captures());

        assert_eq!(ActionKind::ShiftTerrain.target_shape(), TargetShape::Transfer);
        assert_eq!(ActionKind::RaiseTerrain.target_shape(), TargetShape::Cell);
    }

    #[test]
    fn test_action_names_round_trip() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.to_string().parse::<ActionKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
        assert_eq!("SLIDE".parse::<ActionKind>().unwrap(), ActionKind::Slide);
        assert!("fly".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(
            "1,2".parse::<Target>().unwrap(),
            Target::At(Coord::new(1, 2))
        );
        let transfer: Target = "0,0>-1,3".parse().unwrap();
        assert_eq!(
            transfer,
            Target::Transfer {
                from: Coord::new(0, 0),
                to: Coord::new(-1, 3)
            }
        );
        assert_eq!(transfer.to_string(), "0,0>-1,3");
        assert_eq!(transfer.destination(), Coord::new(-1, 3));
        assert!("1,2>".parse::<Target>().is_err());
    }
}
