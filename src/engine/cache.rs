//! Cached derived state.

use tracing::debug;

use crate::error::InvariantFailure;
use crate::game::{GameState, PieceFactory};
use crate::replay::{to_full_state, PersistentState};

/// The game state derived from a persistent document, kept until the
/// document changes.
///
/// The owner must call [`invalidate`](Self::invalidate) whenever it changes
/// the document; reads between changes are free.
#[derive(Debug, Default)]
pub struct DerivedState {
    state: Option<GameState>,
}

impl DerivedState {
    /// An empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// Whether a derived state is held.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.state.is_some()
    }

    /// Drop the derived state.
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    /// The derived state, replaying the document if the cache is empty.
    ///
    /// # Errors
    ///
    /// Returns an invariant failure if the document cannot be replayed.
    pub fn get_or_derive(
        &mut self,
        persistent: &PersistentState,
        factory: &dyn PieceFactory,
    ) -> Result<&GameState, InvariantFailure> {
        let state = match self.state.take() {
            Some(state) => state,
            None => {
                debug!(revision = persistent.revision(), "deriving state");
                to_full_state(persistent, factory)?
            }
        };
        Ok(self.state.insert(state))
    }
}
