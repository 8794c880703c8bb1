//! ASCII renderer for terminal viewing with optional ANSI colors.

use std::fmt::Write;

use crate::game::{Coord, GameState, Owner, Piece, TerrainKind};

/// ANSI color codes by seat.
const PLAYER_COLORS: [&str; 6] = [
    "\x1b[31m", // Seat 1: Red
    "\x1b[34m", // Seat 2: Blue
    "\x1b[32m", // Seat 3: Green
    "\x1b[33m", // Seat 4: Yellow
    "\x1b[35m", // Seat 5: Magenta
    "\x1b[36m", // Seat 6: Cyan
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";
const WATER: &str = "\x1b[94m";

/// Render game state to ASCII.
///
/// Output format (without colors):
/// ```text
/// Turn 3  phase: active  to move: alice (1/1 actions used)
///      -1  0  1
///   -1  .  .  ~
///    0  .  C  G
///    1     .  .
///
/// Legend: .=land  ~=water  uppercase=first seat  lowercase=other seats
///
/// alice: stash 7  on board 2
/// bob:   stash 8  on board 1
/// pool: 20  graveyard: 1
/// ```
#[must_use]
pub fn render_ascii(state: &GameState, color: bool) -> String {
    let mut output = String::new();
    render_header(&mut output, state);
    render_board(&mut output, state, color);
    output.push_str(
        "\nLegend: .=land  ~=water  C=citadel L=lancer G=guard S=skiff B=builder \
         (lowercase: seats after the first)\n\n",
    );
    render_player_stats(&mut output, state);
    output
}

fn render_header(output: &mut String, state: &GameState) {
    let _ = write!(output, "Turn {}  phase: {}", state.turn_number(), state.phase());
    if let Some(player) = state.current_player() {
        let _ = write!(
            output,
            "  to move: {player} ({}/{} actions used)",
            state.actions_this_turn(),
            state.actions_per_turn()
        );
    }
    output.push('\n');
}

fn render_board(output: &mut String, state: &GameState, color: bool) {
    let Some(extent) = state.board().extent() else {
        output.push_str("(empty board)\n");
        return;
    };

    output.push_str("     ");
    for x in extent.min.x..=extent.max.x {
        let _ = write!(output, "{x:>3}");
    }
    output.push('\n');

    for y in extent.min.y..=extent.max.y {
        let _ = write!(output, "{y:>5}");
        for x in extent.min.x..=extent.max.x {
            output.push_str("  ");
            render_cell(output, state, Coord::new(x, y), color);
        }
        output.push('\n');
    }
}

fn render_cell(output: &mut String, state: &GameState, coord: Coord, color: bool) {
    if let Some(piece) = state.unit_at(coord) {
        let seat = seat_of(state, piece);
        let symbol = unit_symbol(piece, seat);
        if color {
            let tint = seat
                .and_then(|s| PLAYER_COLORS.get(s))
                .copied()
                .unwrap_or(WHITE);
            let _ = write!(output, "{tint}{BOLD}{symbol}{RESET}");
        } else {
            output.push(symbol);
        }
        return;
    }

    match (state.terrain_kind_at(coord), color) {
        (Some(TerrainKind::Land), true) => {
            let _ = write!(output, "{GRAY}.{RESET}");
        }
        (Some(TerrainKind::Water), true) => {
            let _ = write!(output, "{WATER}~{RESET}");
        }
        (Some(TerrainKind::Land), false) => output.push('.'),
        (Some(TerrainKind::Water), false) => output.push('~'),
        (None, _) => output.push(' '),
    }
}

/// Seat index of a piece's owner.
fn seat_of(state: &GameState, piece: &Piece) -> Option<usize> {
    match &piece.owner {
        Owner::Player(player) => state.players().iter().position(|p| p == player),
        Owner::Neutral => None,
    }
}

/// First letter of the type tag; uppercase for the first seat.
fn unit_symbol(piece: &Piece, seat: Option<usize>) -> char {
    let letter = piece.type_name().chars().next().unwrap_or('?');
    if seat == Some(0) {
        letter.to_ascii_uppercase()
    } else {
        letter.to_ascii_lowercase()
    }
}

fn render_player_stats(output: &mut String, state: &GameState) {
    let width = state
        .players()
        .iter()
        .map(|p| p.as_str().len())
        .max()
        .unwrap_or(0);
    for player in state.players() {
        let on_board = state
            .pieces()
            .filter(|piece| piece.owner.is(player) && piece.coord().is_some())
            .count();
        let label = format!("{player}:");
        let _ = writeln!(
            output,
            "{label:<pad$} stash {}  on board {on_board}",
            state.stash(player).len(),
            pad = width + 1
        );
    }
    let _ = writeln!(
        output,
        "pool: {}  graveyard: {}",
        state.pool().len(),
        state.graveyard().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::kinds;
    use crate::testing::Fixture;

    fn sample() -> GameState {
        Fixture::new(&["alice", "bob"])
            .land(&[Coord::new(0, 0), Coord::new(1, 0)])
            .water(&[Coord::new(1, 1)])
            .unit("alice", kinds::CITADEL, Coord::new(0, 0))
            .unit("bob", kinds::GUARD, Coord::new(1, 0))
            .build()
    }

    #[test]
    fn test_render_plain() {
        let text = render_ascii(&sample(), false);
        assert!(text.starts_with("Turn 1  phase: active  to move: alice"));
        assert!(text.contains("    0  C  g\n"), "{text}");
        assert!(text.contains("    1     ~\n"), "{text}");
        assert!(text.contains("pool: 47  graveyard: 0"), "{text}");
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_render_colored() {
        let text = render_ascii(&sample(), true);
        assert!(text.contains(RESET));
        assert!(text.contains(PLAYER_COLORS[0]));
    }

    #[test]
    fn test_render_empty_board() {
        let state = Fixture::new(&["alice"]).build();
        assert!(render_ascii(&state, false).contains("(empty board)"));
    }
}
