//! Pieces as data.
//!
//! A piece type is a [`PieceSpec`]: a type tag, a class (terrain or unit),
//! the ordered list of actions it supports and a couple of capability
//! flags. Adding a piece type means registering a new spec in a
//! [`PieceCatalog`]; no per-type code exists outside the action rules.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::action::ActionKind;
use crate::error::InvariantFailure;
use crate::game::{Coord, Layer, Owner, PlayerId};

/// Stable identifier for a piece.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

/// Id prefix of pieces that start in the shared pool.
pub const POOL_PREFIX: &str = "pool";

impl PieceId {
    /// Create a piece id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PieceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of terrain tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerrainKind {
    /// Walkable ground.
    Land,
    /// Only water-capable pieces may stand on it.
    Water,
}

/// Which board layer a piece type lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceClass {
    /// A terrain tile; occupies the terrain layer and needs no support.
    Terrain(TerrainKind),
    /// A unit; occupies the piece layer on top of terrain.
    Unit,
}

impl PieceClass {
    /// Board layer this class occupies.
    #[must_use]
    pub const fn layer(self) -> Layer {
        match self {
            Self::Terrain(_) => Layer::Terrain,
            Self::Unit => Layer::Piece,
        }
    }
}

/// Definition of a piece type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSpec {
    /// Type tag, used in serialized records and piece ids.
    pub name: String,
    /// Terrain or unit.
    pub class: PieceClass,
    /// Supported actions, in presentation order.
    pub actions: Vec<ActionKind>,
    /// Whether the piece may enter water.
    pub water_capable: bool,
    /// Whether this is a home-base piece (citadel).
    pub home_base: bool,
}

impl PieceSpec {
    /// A unit type with the given actions.
    #[must_use]
    pub fn unit(name: impl Into<String>, actions: &[ActionKind]) -> Self {
        Self {
            name: name.into(),
            class: PieceClass::Unit,
            actions: actions.to_vec(),
            water_capable: false,
            home_base: false,
        }
    }

    /// A terrain tile type.
    #[must_use]
    pub fn terrain(name: impl Into<String>, kind: TerrainKind) -> Self {
        Self {
            name: name.into(),
            class: PieceClass::Terrain(kind),
            actions: vec![ActionKind::Place],
            water_capable: false,
            home_base: false,
        }
    }

    /// Mark the type as able to enter water.
    #[must_use]
    pub fn water_capable(mut self) -> Self {
        self.water_capable = true;
        self
    }

    /// Mark the type as a home base.
    #[must_use]
    pub fn home_base(mut self) -> Self {
        self.home_base = true;
        self
    }

    /// Whether this type lives in the terrain layer.
    #[must_use]
    pub const fn is_terrain(&self) -> bool {
        matches!(self.class, PieceClass::Terrain(_))
    }

    /// Terrain kind, for terrain types.
    #[must_use]
    pub const fn terrain_kind(&self) -> Option<TerrainKind> {
        match self.class {
            PieceClass::Terrain(kind) => Some(kind),
            PieceClass::Unit => None,
        }
    }

    /// Whether the type supports an action.
    #[must_use]
    pub fn supports(&self, action: ActionKind) -> bool {
        self.actions.contains(&action)
    }
}

/// Where a piece currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// On the board.
    Board(Coord),
    /// In a player's stash.
    Stash(PlayerId),
    /// In the shared pool.
    Pool,
    /// Captured or consumed.
    Graveyard,
}

/// A piece instance.
///
/// The location is owned by the state that holds the piece: cloning a
/// state clones its pieces, and each copy moves independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Stable identity.
    pub id: PieceId,
    /// Owner.
    pub owner: Owner,
    /// Type definition, shared and immutable.
    pub spec: Arc<PieceSpec>,
    /// Current location.
    pub location: Location,
}

impl Piece {
    /// Create a piece.
    #[must_use]
    pub fn new(id: PieceId, owner: Owner, spec: Arc<PieceSpec>, location: Location) -> Self {
        Self {
            id,
            owner,
            spec,
            location,
        }
    }

    /// Board coordinate, if on the board.
    #[must_use]
    pub const fn coord(&self) -> Option<Coord> {
        match self.location {
            Location::Board(coord) => Some(coord),
            _ => None,
        }
    }

    /// Type tag.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.spec.name
    }

    /// Serializable record of this piece (without its location).
    #[must_use]
    pub fn record(&self) -> PieceRecord {
        PieceRecord {
            id: self.id.clone(),
            owner: self.owner.clone(),
            piece_type: self.spec.name.clone(),
        }
    }
}

/// Serialized form of a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceRecord {
    /// Piece id.
    pub id: PieceId,
    /// Owner.
    pub owner: Owner,
    /// Type tag.
    #[serde(rename = "type")]
    pub piece_type: String,
}

/// Reconstructs pieces from type tags.
///
/// Supplied by the host so the engine never hard-codes the full set of
/// piece types it must be able to rebuild.
pub trait PieceFactory: Send + Sync {
    /// Look up a piece type by tag.
    fn spec(&self, name: &str) -> Option<Arc<PieceSpec>>;

    /// Rebuild a piece from its record, placed at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantFailure::UnknownPieceType`] when the tag is unknown.
    fn piece_from_record(
        &self,
        record: &PieceRecord,
        location: Location,
    ) -> Result<Piece, InvariantFailure> {
        let spec = self.resolve(&record.piece_type)?;
        Ok(Piece::new(
            record.id.clone(),
            record.owner.clone(),
            spec,
            location,
        ))
    }

    /// Look up a piece type, failing loudly when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantFailure::UnknownPieceType`] when the tag is unknown.
    fn resolve(&self, name: &str) -> Result<Arc<PieceSpec>, InvariantFailure> {
        self.spec(name).ok_or_else(|| {
            error!(piece_type = name, "piece factory cannot build unknown type");
            InvariantFailure::UnknownPieceType(name.to_string())
        })
    }
}

/// Type tags of the standard catalogue.
pub mod kinds {
    /// Land terrain tile.
    pub const LAND: &str = "land";
    /// Water terrain tile.
    pub const WATER: &str = "water";
    /// Home base.
    pub const CITADEL: &str = "citadel";
    /// Long-range orthogonal mover.
    pub const LANCER: &str = "lancer";
    /// Short-range mover.
    pub const GUARD: &str = "guard";
    /// Water-capable boat.
    pub const SKIFF: &str = "skiff";
    /// Terrain manipulator.
    pub const BUILDER: &str = "builder";
}

/// A registry of piece types.
#[derive(Debug, Clone, Default)]
pub struct PieceCatalog {
    specs: BTreeMap<String, Arc<PieceSpec>>,
}

impl PieceCatalog {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard piece set.
    #[must_use]
    pub fn standard() -> Self {
        use ActionKind::{Paddle, Place, RaiseTerrain, ShiftTerrain, SinkTerrain, Slide, Step, Walk};

        let mut catalog = Self::new();
        catalog.register(PieceSpec::terrain(kinds::LAND, TerrainKind::Land));
        catalog.register(PieceSpec::terrain(kinds::WATER, TerrainKind::Water));
        catalog.register(PieceSpec::unit(kinds::CITADEL, &[Place]).home_base());
        catalog.register(PieceSpec::unit(kinds::LANCER, &[Place, Slide]));
        catalog.register(PieceSpec::unit(kinds::GUARD, &[Place, Step]));
        catalog.register(PieceSpec::unit(kinds::SKIFF, &[Place, Paddle]).water_capable());
        catalog.register(PieceSpec::unit(
            kinds::BUILDER,
            &[Place, Walk, RaiseTerrain, ShiftTerrain, SinkTerrain],
        ));
        catalog
    }

    /// Add or replace a piece type.
    pub fn register(&mut self, spec: PieceSpec) {
        self.specs.insert(spec.name.clone(), Arc::new(spec));
    }

    /// Iterate over registered types in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PieceSpec>> {
        self.specs.values()
    }
}

impl PieceFactory for PieceCatalog {
    fn spec(&self, name: &str) -> Option<Arc<PieceSpec>> {
        self.specs.get(name).cloned()
    }
}
