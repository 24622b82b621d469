//! Game flow resolver (spec §4.11): end turn, turnover, touchdown, half-time.

use crate::dice::DiceSource;
use crate::geometry::Side;
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::{PlayerId, PlayerState};
use crate::state::{GameState, Phase};

/// Marks `turnoverPending` and immediately ends the acting team's turn.
/// Every failure path in the other sub-resolvers (dodge, GFI, pickup, pass,
/// catch-while-carrier, attacker-down/both-down block, failed hand-off,
/// illegal procedure) routes here rather than duplicating end-turn logic.
pub fn apply_turnover(state: &mut GameState, dice: &mut dyn DiceSource, events: &mut EventLog) {
    state.set_turnover_pending(true);
    events.push(GameEvent::new(EventKind::Turnover, "turn ends on turnover"));
    end_turn(state, dice, events);
}

/// Increments the active team's `turnNumber`, resets per-turn flags, wakes
/// stunned players on the *incoming* team to prone, and hands the turn to
/// the other side. Crossing turn 8 in either half transitions phase.
pub fn end_turn(state: &mut GameState, _dice: &mut dyn DiceSource, events: &mut EventLog) {
    let ending_side = state.active_team();
    {
        let team = state.team_mut(ending_side);
        team.turn_number += 1;
        team.reset_turn_flags();
    }
    state.set_turnover_pending(false);

    let incoming_side = ending_side.opponent();
    recover_stunned_to_prone(state, incoming_side);
    reset_player_turn_flags(state, incoming_side);
    state.set_active_team(incoming_side);

    events.push(GameEvent::new(EventKind::EndTurn, format!("{ending_side:?} ends their turn")));

    // Only the ending side's counter advances on any single END_TURN, so the
    // half/game transition can't wait for both to cross 8: it fires once the
    // ending side crosses 8 and the opponent has reached its own turn 8.
    let ending_crossed = state.team(ending_side).has_finished_half();
    let opponent_reached_final_turn = state.team(incoming_side).turn_number >= 8;
    if ending_crossed && opponent_reached_final_turn {
        if state.half() == 1 {
            state.set_phase(Phase::HalfTime);
        } else {
            state.set_phase(Phase::GameOver);
        }
    }
}

fn recover_stunned_to_prone(state: &mut GameState, side: Side) {
    let ids: Vec<PlayerId> = state
        .players_on_side(side)
        .filter(|p| p.state == PlayerState::Stunned)
        .map(|p| p.id)
        .collect();
    for id in ids {
        if let Some(p) = state.player_mut(id) {
            p.state = PlayerState::Prone;
        }
    }
}

fn reset_player_turn_flags(state: &mut GameState, side: Side) {
    let ids: Vec<PlayerId> = state.players_on_side(side).map(|p| p.id).collect();
    for id in ids {
        if let Some(p) = state.player_mut(id) {
            p.reset_turn_flags();
        }
    }
}

/// Which side, if any, has just scored by carrying the ball into the
/// opposing end zone. Pure query — the action resolver decides whether and
/// when to invoke [`resolve_touchdown`] after consulting this.
pub fn check_touchdown(state: &GameState) -> Option<Side> {
    let carrier_id = state.ball().carrier()?;
    let carrier = state.player(carrier_id)?;
    if carrier.state != PlayerState::Standing {
        return None;
    }
    let pos = carrier.position?;
    if pos.is_opposing_end_zone(carrier.team_side) {
        Some(carrier.team_side)
    } else {
        None
    }
}

/// Scores the team, clears the ball, resets every on-pitch player to
/// `off_pitch`, and transitions to `setup` with kickoff going to the
/// scoring team's opponent (the scoring team receives the ball again).
pub fn resolve_touchdown(state: &mut GameState, scoring_side: Side, events: &mut EventLog) {
    state.team_mut(scoring_side).score += 1;
    events.push(GameEvent::new(EventKind::Touchdown, format!("{scoring_side:?} scores")));

    let ids: Vec<PlayerId> = state.players.keys().copied().collect();
    for id in ids {
        if let Some(p) = state.player_mut(id) {
            if p.is_on_pitch() {
                p.state = PlayerState::OffPitch;
                p.position = None;
            }
        }
    }
    state.set_ball(Ball::OffPitch);
    state.set_turnover_pending(false);
    state.set_phase(Phase::Setup);
    state.set_kicking_team(scoring_side);
}

/// Half-time: KO recovery roll (4+ returns to reserves) for every KO'd
/// player, per-turn flags reset, both teams back to `setup`.
pub fn resolve_half_time(state: &mut GameState, dice: &mut dyn DiceSource, events: &mut EventLog) {
    let ko_ids: Vec<PlayerId> = state.players.values().filter(|p| p.state == PlayerState::Ko).map(|p| p.id).collect();
    for id in ko_ids {
        let roll = dice.roll_d6();
        let recovered = roll >= 4;
        if recovered {
            if let Some(p) = state.player_mut(id) {
                p.state = PlayerState::OffPitch;
            }
        }
        events.push(
            GameEvent::new(EventKind::Injury, format!("{id:?} KO recovery roll {roll}"))
                .with("recovered", recovered)
                .with("playerId", id.0),
        );
    }

    for side in [Side::Home, Side::Away] {
        state.team_mut(side).reset_turn_flags();
        state.team_mut(side).turn_number = 1;
    }
    state.set_half(2);
    state.set_phase(Phase::Setup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::model::player::{Player, PlayerStats};
    use crate::model::skills::SkillSet;
    use crate::model::team::TeamState;

    fn base_state() -> GameState {
        let mut s = GameState::new(
            TeamState::new("home", "Home", "humans", Side::Home),
            TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Away,
        );
        s.set_phase(Phase::Play);
        s.set_active_team(Side::Home);
        s
    }

    #[test]
    fn turn_eight_in_second_half_ends_the_game() {
        let mut s = base_state();
        s.set_half(2);
        s.team_mut(Side::Home).turn_number = 8;
        s.team_mut(Side::Away).turn_number = 8;
        let mut dice = ScriptedDice::new();
        let mut events = EventLog::new();
        end_turn(&mut s, &mut dice, &mut events);
        assert_eq!(s.phase(), Phase::GameOver);
    }

    #[test]
    fn first_half_turn_eight_goes_to_half_time_not_game_over() {
        let mut s = base_state();
        s.set_half(1);
        s.team_mut(Side::Home).turn_number = 8;
        s.team_mut(Side::Away).turn_number = 8;
        let mut dice = ScriptedDice::new();
        let mut events = EventLog::new();
        end_turn(&mut s, &mut dice, &mut events);
        assert_eq!(s.phase(), Phase::HalfTime);
    }

    #[test]
    fn touchdown_scores_and_resets_to_setup() {
        let mut s = base_state();
        let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
        let mut carrier =
            Player::new(PlayerId(1), Side::Home, "P", 1, "Lineman", stats, SkillSet::new());
        carrier.state = PlayerState::Standing;
        carrier.position = Some(crate::geometry::Position::new(25, 7));
        s.players.insert(carrier.id, carrier);
        s.set_ball(Ball::Held(PlayerId(1)));

        assert_eq!(check_touchdown(&s), Some(Side::Home));
        let mut events = EventLog::new();
        resolve_touchdown(&mut s, Side::Home, &mut events);
        assert_eq!(s.team(Side::Home).score, 1);
        assert_eq!(s.phase(), Phase::Setup);
        assert_eq!(s.ball(), Ball::OffPitch);
        assert!(s.player(PlayerId(1)).unwrap().position.is_none());
    }

    #[test]
    fn half_time_recovers_ko_on_a_four_plus() {
        let mut s = base_state();
        let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
        let mut p = Player::new(PlayerId(1), Side::Home, "P", 1, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Ko;
        s.players.insert(p.id, p);
        let mut dice = ScriptedDice::new().with_d6([5]);
        let mut events = EventLog::new();
        resolve_half_time(&mut s, &mut dice, &mut events);
        assert_eq!(s.player(PlayerId(1)).unwrap().state, PlayerState::OffPitch);
        assert_eq!(s.half(), 2);
    }
}
