//! Tacklezone calculator (spec §4.2).

use crate::geometry::{adjacent, Position, Side};
use crate::state::GameState;

/// Number of enemy tacklezones projected onto `square`, from the
/// perspective of the team `for_side` is defending against.
pub fn tacklezones_on(state: &GameState, square: Position, for_side: Side) -> u32 {
    let enemy = for_side.opponent();
    state
        .players_on_side(enemy)
        .filter(|p| p.has_tacklezone())
        .filter(|p| p.position.map(|pos| adjacent(pos).contains(&square)).unwrap_or(false))
        .count() as u32
}
