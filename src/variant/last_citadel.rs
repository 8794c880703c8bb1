//! Last player with a citadel standing wins.

use crate::game::{GameState, Phase};
use crate::variant::{GameEnd, Variant};

pub(super) const NAME: &str = "last-citadel";

/// The only player still holding an on-board citadel wins. If nobody
/// holds one, the game is a draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastCitadelStanding;

impl Variant for LastCitadelStanding {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check_end(&self, state: &GameState) -> Option<GameEnd> {
        if !matches!(state.phase(), Phase::Active | Phase::Finished) {
            return None;
        }
        let mut standing = state
            .players()
            .iter()
            .filter(|player| !state.citadels_of(player).is_empty());
        match (standing.next(), standing.next()) {
            (None, _) => Some(GameEnd::draw("no citadels remain")),
            (Some(winner), None) => Some(GameEnd::win(
                winner.clone(),
                "last player with a citadel standing",
            )),
            (Some(_), Some(_)) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{kinds, Coord, PlayerId};
    use crate::testing::Fixture;

    #[test]
    fn test_game_continues_while_two_stand() {
        let state = Fixture::new(&["alice", "bob"])
            .land(&[Coord::new(0, 0), Coord::new(5, 5)])
            .unit("alice", kinds::CITADEL, Coord::new(0, 0))
            .unit("bob", kinds::CITADEL, Coord::new(5, 5))
            .build();
        assert_eq!(LastCitadelStanding.check_end(&state), None);
    }

    #[test]
    fn test_sole_survivor_wins() {
        let state = Fixture::new(&["alice", "bob"])
            .land(&[Coord::new(5, 5)])
            .unit("bob", kinds::CITADEL, Coord::new(5, 5))
            .build();
        let end = LastCitadelStanding.check_end(&state).unwrap();
        assert_eq!(end.winner, Some(PlayerId::from("bob")));
    }

    #[test]
    fn test_no_citadels_is_draw() {
        let state = Fixture::new(&["alice", "bob"]).build();
        let end = LastCitadelStanding.check_end(&state).unwrap();
        assert_eq!(end.winner, None);
    }

    #[test]
    fn test_finished_game_keeps_its_result() {
        let state = Fixture::new(&["alice", "bob"])
            .phase(Phase::Finished)
            .land(&[Coord::new(5, 5)])
            .unit("bob", kinds::CITADEL, Coord::new(5, 5))
            .build();
        let end = LastCitadelStanding.check_end(&state).unwrap();
        assert_eq!(end.winner, Some(PlayerId::from("bob")));
    }

    #[test]
    fn test_only_checked_during_play() {
        let state = Fixture::new(&["alice", "bob"]).phase(Phase::Setup).build();
        assert_eq!(LastCitadelStanding.check_end(&state), None);
    }
}
