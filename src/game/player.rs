//! Player identity and piece ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a player.
///
/// Player ids come from the host application (account ids, seat names) and
/// are treated as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a player id.
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

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a piece belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    /// Owned by a player.
    Player(PlayerId),
    /// Unowned (terrain tiles in the shared pool or on the board).
    Neutral,
}

impl Owner {
    /// The owning player, if any.
    #[must_use]
    pub const fn player(&self) -> Option<&PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            Self::Neutral => None,
        }
    }

    /// Whether this owner is exactly `player`.
    #[must_use]
    pub fn is(&self, player: &PlayerId) -> bool {
        self.player() == Some(player)
    }

    /// Whether the piece may be moved by `player` on their turn.
    ///
    /// Neutral pieces are moved by whoever is acting.
    #[must_use]
    pub fn acts_for(&self, player: &PlayerId) -> bool {
        match self {
            Self::Player(id) => id == player,
            Self::Neutral => true,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_acts_for() {
        let alice = PlayerId::from("alice");
        let bob = PlayerId::from("bob");

        let owner = Owner::Player(alice.clone());
        assert!(owner.acts_for(&alice));
        assert!(!owner.acts_for(&bob));
        assert!(owner.is(&alice));

        assert!(Owner::Neutral.acts_for(&bob));
        assert!(!Owner::Neutral.is(&bob));
        assert_eq!(Owner::Neutral.player(), None);
    }

    #[test]
    fn test_owner_serde() {
        let json = serde_json::to_string(&Owner::Player(PlayerId::from("alice"))).unwrap();
        assert_eq!(json, r#"{"player":"alice"}"#);
        let json = serde_json::to_string(&Owner::Neutral).unwrap();
        assert_eq!(json, r#""neutral""#);
    }
}
