//! Property-based tests backing the two universal properties from spec §8:
//! on-pitch positions stay pairwise distinct, and every square
//! `rules::valid_moves_for` offers is one the action resolver actually
//! accepts. Random legal states are built directly rather than via a
//! generic `Arbitrary` derive, since a `GameState` has cross-field
//! invariants (on-pitch-ness agrees with `Option<Position>`, at most one
//! player per square) that a field-by-field generator would violate.

use proptest::prelude::*;

use gridiron_core::dice::ScriptedDice;
use gridiron_core::engine::action_resolver::resolve;
use gridiron_core::engine::rules::{valid_moves_for, Action};
use gridiron_core::geometry::{Position, Side};
use gridiron_core::model::player::{Player, PlayerId, PlayerState, PlayerStats};
use gridiron_core::model::skills::SkillSet;
use gridiron_core::model::team::TeamState;
use gridiron_core::{GameState, Phase};

/// The pitch has exactly 390 squares (26 * 15); `PERMUTE_STRIDE` is coprime
/// with 390 (its only prime factors are 2, 3, 5, 13 — `PERMUTE_STRIDE` is
/// 7), so `idx -> (idx * PERMUTE_STRIDE + offset) % 390` is a bijection on
/// `0..390` for any `offset`. That guarantees `next_square` below always
/// terminates after at most 390 probes, unlike a hash-and-retry scheme that
/// could in principle cycle through fewer than `count` distinct squares.
const PITCH_SQUARES: u64 = 26 * 15;
const PERMUTE_STRIDE: u64 = 7;

fn index_to_position(idx: u64) -> Position {
    Position::new((idx % 26) as i32, (idx / 26) as i32)
}

/// Builds a `Play`-phase state with `count` home players and `count` away
/// players scattered onto distinct squares chosen from `seed`, all with
/// movement allowance `movement`. Squares are a permutation of the pitch
/// indexed by `seed`, so the on-pitch-positions-unique invariant holds by
/// construction, the way a real setup phase would leave it.
fn scattered_state(seed: u64, count: u8, movement: u8) -> GameState {
    let mut state = GameState::new(
        TeamState::new("home", "Home", "humans", Side::Home),
        TeamState::new("away", "Away", "orcs", Side::Away),
        Side::Away,
    )
    .with_phase(Phase::Play)
    .with_active_team(Side::Home);

    let stats = PlayerStats { movement: movement.max(1), strength: 3, agility: 3, armour: 8 };
    let next_square = |offset: u64| -> Position {
        let idx = (offset.wrapping_mul(PERMUTE_STRIDE).wrapping_add(seed)) % PITCH_SQUARES;
        index_to_position(idx)
    };

    for i in 0..count {
        let pos = next_square(i as u64);
        let mut p = Player::new(PlayerId(1 + i as u32), Side::Home, "P", i, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p.flags.movement_remaining = stats.movement;
        state = state.with_player_added(p);
    }
    for i in 0..count {
        let pos = next_square(100 + i as u64);
        let mut p = Player::new(PlayerId(100 + i as u32), Side::Away, "P", i, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p.flags.movement_remaining = stats.movement;
        state = state.with_player_added(p);
    }
    state
}

proptest! {
    /// On-pitch positions stay pairwise distinct across a batch of
    /// generated states — the invariant `GameState::assert_invariants`
    /// (and `resolve`, which calls it after every transition) enforces.
    #[test]
    fn prop_on_pitch_positions_are_always_unique(seed in any::<u64>(), count in 1u8..8, movement in 1u8..9) {
        let state = scattered_state(seed, count, movement);
        state.assert_invariants();

        let mut seen = std::collections::HashSet::new();
        for side in [Side::Home, Side::Away] {
            for p in state.players_on_pitch(side) {
                let pos = p.position.expect("on-pitch player has a position");
                prop_assert!(seen.insert(pos), "duplicate on-pitch position {:?}", pos);
            }
        }
    }

    /// Every square `valid_moves_for` offers for a mover is one `resolve`
    /// accepts without raising `IllegalAction` — §8's consistency property
    /// between the rules engine and the action resolver.
    #[test]
    fn prop_valid_moves_are_always_dispatchable(seed in any::<u64>(), count in 1u8..6, movement in 2u8..9) {
        let state = scattered_state(seed, count, movement);
        let mover_id = PlayerId(1);
        if state.player(mover_id).is_none() {
            return Ok(());
        }

        for opt in valid_moves_for(&state, mover_id) {
            // A generous all-sixes scripted stream: every dodge/GFI this
            // path could attempt succeeds, so only legality (never a
            // failed roll) can make `resolve` report failure.
            let mut dice = ScriptedDice::new().with_d6(vec![6; 32]);
            let result = resolve(&state, Action::Move { player_id: mover_id, x: opt.position.x, y: opt.position.y }, &mut dice, || true, |_| false);
            prop_assert!(result.success, "{:?} offered by valid_moves_for but rejected: {:?}", opt.position, result.error);
        }
    }
}
