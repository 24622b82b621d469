//! Scatter calculator (spec §4.7 bounce / throw-in): deviation direction,
//! distance, and the off-pitch throw-in fallback. Pure position arithmetic —
//! callers (ball resolver, kickoff resolver) decide what a landing square
//! means for players standing on it.

use crate::dice::DiceSource;
use crate::geometry::{Position, DIRECTIONS_8, PITCH_HEIGHT, PITCH_WIDTH};

/// Maps a d8 roll (1..=8) onto one of the 8 Moore directions.
pub fn direction_for_roll(roll: u8) -> (i32, i32) {
    DIRECTIONS_8[((roll.max(1) - 1) as usize) % DIRECTIONS_8.len()]
}

/// The unit vector pointing back onto the pitch from `square`, component by
/// component: `-1`/`+1` on whichever axis is out of bounds, `0` on the axis
/// that's already in range. Off a corner this is a diagonal; off a single
/// edge it's the straight-back direction — there's exactly one edge-crossing
/// geometry can name, so no die roll is involved.
fn inward_direction(square: Position) -> (i32, i32) {
    let dx = if square.x < 0 {
        1
    } else if square.x >= PITCH_WIDTH {
        -1
    } else {
        0
    };
    let dy = if square.y < 0 {
        1
    } else if square.y >= PITCH_HEIGHT {
        -1
    } else {
        0
    };
    (dx, dy)
}

/// One scatter step: roll d8, translate `from` by the resulting direction.
/// May land off-pitch — callers that need an on-pitch result should use
/// [`bounce_once`] instead.
pub fn scatter_once(dice: &mut dyn DiceSource, from: Position) -> Position {
    let (dx, dy) = direction_for_roll(dice.roll_d8());
    from.translated(dx, dy)
}

/// Throw-in resolution: the ball is walked back in from `off_pitch_square`
/// along the edge it actually crossed, at a d3-rolled distance, clamped back
/// onto the pitch as a last resort against a distance that overshoots the
/// far side.
pub fn throw_in(dice: &mut dyn DiceSource, off_pitch_square: Position) -> Position {
    let (dx, dy) = inward_direction(off_pitch_square);
    let distance = dice.roll_d3() as i32;
    Position::new(
        (off_pitch_square.x + dx * distance).clamp(0, PITCH_WIDTH - 1),
        (off_pitch_square.y + dy * distance).clamp(0, PITCH_HEIGHT - 1),
    )
}

/// A single bounce: scatter once; if it lands off-pitch, resolve a throw-in
/// from that off-pitch square instead (spec §4.7 Bounce).
pub fn bounce_once(dice: &mut dyn DiceSource, from: Position) -> Position {
    let landed = scatter_once(dice, from);
    if landed.is_on_pitch() {
        landed
    } else {
        throw_in(dice, landed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn scatter_translates_by_the_rolled_direction() {
        let mut dice = ScriptedDice::new().with_d8([1]); // north: (0, -1)
        let landed = scatter_once(&mut dice, Position::new(5, 5));
        assert_eq!(landed, Position::new(5, 4));
    }

    #[test]
    fn bounce_off_the_top_edge_falls_back_to_throw_in() {
        // d8=1 is north, which carries y=0 off the pitch; throw_in then
        // walks back in along the crossed (top) edge at a d3-rolled distance.
        let mut dice = ScriptedDice::new().with_d8([1]).with_d6([3]);
        let landed = bounce_once(&mut dice, Position::new(5, 0));
        assert_eq!(landed, Position::new(5, 1));
    }

    #[test]
    fn throw_in_walks_back_in_along_the_crossed_edge() {
        let mut dice = ScriptedDice::new().with_d6([5]); // d3 = 3
        let landed = throw_in(&mut dice, Position::new(30, 5));
        assert_eq!(landed, Position::new(23, 5));
    }

    #[test]
    fn throw_in_off_a_corner_walks_back_in_diagonally() {
        let mut dice = ScriptedDice::new().with_d6([1]); // d3 = 1
        let landed = throw_in(&mut dice, Position::new(-1, -1));
        assert_eq!(landed, Position::new(0, 0));
    }

    #[test]
    fn bounce_within_bounds_does_not_consume_throw_in_dice() {
        let mut dice = ScriptedDice::new().with_d8([3]); // east: (1, 0)
        let landed = bounce_once(&mut dice, Position::new(5, 5));
        assert_eq!(landed, Position::new(6, 5));
    }
}
