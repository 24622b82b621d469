//! Strength calculator (spec §4.6): assist counting and block-die count
//! selection.

use crate::geometry::{adjacent, Position, Side};
use crate::model::player::PlayerId;
use crate::state::GameState;

/// Standing teammates of `side`, adjacent to `around`, other than `exclude`.
/// This is how many assists a player at `around` can draw from their team.
pub fn assist_count(state: &GameState, side: Side, around: Position, exclude: PlayerId) -> u32 {
    adjacent(around)
        .into_iter()
        .filter_map(|pos| state.player_at(pos))
        .filter(|p| p.id != exclude && p.team_side == side && p.is_standing())
        .count() as u32
}

/// Attacker and defender effective strength (base stat + assists), in that order.
pub fn effective_strengths(state: &GameState, attacker_id: PlayerId, defender_id: PlayerId) -> (u32, u32) {
    let attacker = state.player(attacker_id).expect("attacker must exist");
    let defender = state.player(defender_id).expect("defender must exist");
    let attacker_pos = attacker.position.expect("attacker must be on pitch");
    let defender_pos = defender.position.expect("defender must be on pitch");

    let attacker_assists = assist_count(state, attacker.team_side, defender_pos, attacker_id);
    let defender_assists = assist_count(state, defender.team_side, attacker_pos, defender_id);

    (
        attacker.stats.strength as u32 + attacker_assists,
        defender.stats.strength as u32 + defender_assists,
    )
}

/// `max(1, min(3, |diff|+1))` per spec §4.6.
pub fn block_dice_count(attack_strength: u32, defend_strength: u32) -> u8 {
    let diff = (attack_strength as i64 - defend_strength as i64).unsigned_abs();
    (diff + 1).clamp(1, 3) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceChooser {
    Attacker,
    Defender,
}

/// Stronger side chooses which die/dice to keep; equal strength, attacker chooses.
pub fn dice_chooser(attack_strength: u32, defend_strength: u32) -> DiceChooser {
    if attack_strength >= defend_strength {
        DiceChooser::Attacker
    } else {
        DiceChooser::Defender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::{Player, PlayerStats};
    use crate::model::skills::SkillSet;
    use crate::model::team::TeamState;

    fn base_state() -> GameState {
        GameState::new(
            TeamState::new("home", "Home", "humans", Side::Home),
            TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Home,
        )
    }

    fn standing(id: u32, side: Side, pos: Position, strength: u8) -> Player {
        let stats = PlayerStats { movement: 6, strength, agility: 3, armour: 8 };
        let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
        p.state = crate::model::player::PlayerState::Standing;
        p.position = Some(pos);
        p
    }

    #[test]
    fn assist_counts_only_standing_teammates_adjacent_to_the_target() {
        let mut s = base_state();
        let attacker = standing(1, Side::Home, Position::new(4, 5), 3);
        let assist = standing(2, Side::Home, Position::new(5, 4), 3);
        let defender = standing(3, Side::Away, Position::new(5, 5), 3);
        s.players.insert(attacker.id, attacker);
        s.players.insert(assist.id, assist);
        s.players.insert(defender.id, defender);
        assert_eq!(assist_count(&s, Side::Home, Position::new(5, 5), PlayerId(1)), 1);
    }

    #[test]
    fn equal_strength_yields_one_die_and_attacker_chooses() {
        assert_eq!(block_dice_count(3, 3), 1);
        assert_eq!(dice_chooser(3, 3), DiceChooser::Attacker);
    }

    #[test]
    fn dice_count_caps_at_three() {
        assert_eq!(block_dice_count(6, 1), 3);
        assert_eq!(dice_chooser(6, 1), DiceChooser::Attacker);
        assert_eq!(dice_chooser(1, 6), DiceChooser::Defender);
    }
}
