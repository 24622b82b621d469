//! Kickoff resolver (spec §4.9): kick placement, scatter, touchback, and
//! the 2d6 kickoff event table.

use crate::dice::DiceSource;
use crate::engine::ball_resolver::attempt_catch;
use crate::engine::block::{injure, knock_down};
use crate::engine::scatter::direction_for_roll;
use crate::geometry::{Position, Side, LOS_X_HIGH, LOS_X_LOW, PITCH_HEIGHT};
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::PlayerId;
use crate::model::skills::{Skill, SkillSet};
use crate::state::{GameState, Weather};

/// The default kick target: center of the receiving team's own half.
pub fn kickoff_target(receiving_side: Side) -> Position {
    match receiving_side {
        Side::Home => Position::new(LOS_X_LOW / 2, PITCH_HEIGHT / 2),
        Side::Away => Position::new((crate::geometry::AWAY_END_ZONE_X + LOS_X_HIGH) / 2, PITCH_HEIGHT / 2),
    }
}

fn is_on_kicking_side(pos: Position, kicking_side: Side) -> bool {
    match kicking_side {
        Side::Home => pos.x <= LOS_X_LOW - 1,
        Side::Away => pos.x >= LOS_X_HIGH + 1,
    }
}

/// The twelve 2d6 kickoff table entries named in the spec. "Weather Change"
/// and "Changing Weather" name the same reroll-the-weather-table mechanic in
/// the source material; they are merged into one [`KickoffEvent::ChangingWeather`]
/// variant here rather than inventing a second distinct effect (documented in
/// DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickoffEvent {
    ChangingWeather,
    PerfectDefense,
    Riot,
    HighKick,
    CheeringFans,
    BrilliantCoaching,
    QuickSnap,
    Blitz,
    BlitzBang,
    ThrowARock,
    PitchInvasion,
}

fn kickoff_event_for_roll(sum: u8) -> KickoffEvent {
    match sum {
        2 => KickoffEvent::ChangingWeather,
        3 => KickoffEvent::PerfectDefense,
        4 => KickoffEvent::Riot,
        5 => KickoffEvent::HighKick,
        6 => KickoffEvent::CheeringFans,
        7 => KickoffEvent::BrilliantCoaching,
        8 => KickoffEvent::QuickSnap,
        9 => KickoffEvent::Blitz,
        10 => KickoffEvent::BlitzBang,
        11 => KickoffEvent::ThrowARock,
        _ => KickoffEvent::PitchInvasion,
    }
}

pub fn roll_weather_table(dice: &mut dyn DiceSource) -> Weather {
    let (a, b) = dice.roll_2d6();
    match a + b {
        2 => Weather::Sweltering,
        3..=5 => Weather::VerySunny,
        9..=11 => Weather::PouringRain,
        12 => Weather::Blizzard,
        _ => Weather::Nice,
    }
}

pub struct KickoffOutcome {
    pub event: KickoffEvent,
    pub touchback: bool,
}

/// Resolves ball placement, scatter and the kickoff event table once both
/// teams have completed setup. `reposition_hook` is the caller's (driver's)
/// chance to let a `Coach` reposition players for Perfect Defense / Quick
/// Snap; the default no-op is correct for coaches that don't implement
/// in-kickoff repositioning.
pub fn resolve_kickoff(
    state: &mut GameState,
    target_override: Option<Position>,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    reposition_hook: impl FnOnce(&mut GameState, KickoffEvent),
) -> KickoffOutcome {
    let kicking_side = state.kicking_team();
    let receiving_side = kicking_side.opponent();
    let target = target_override.unwrap_or_else(|| kickoff_target(receiving_side));

    let (dx, dy) = direction_for_roll(dice.roll_d8());
    let distance = dice.roll_d6() as i32;
    let landing = target.translated(dx * distance, dy * distance);

    events.push(
        GameEvent::new(EventKind::Kickoff, format!("ball kicked toward {target:?}, scatters to {landing:?}"))
            .with("x", landing.x as i64)
            .with("y", landing.y as i64),
    );

    let touchback = !landing.is_on_pitch() || is_on_kicking_side(landing, kicking_side);
    if touchback {
        let mut holders: Vec<PlayerId> = state
            .players_on_pitch(receiving_side)
            .filter(|p| p.is_standing())
            .map(|p| p.id)
            .collect();
        holders.sort();
        if let Some(&holder) = holders.first() {
            state.set_ball(Ball::Held(holder));
            events.push(GameEvent::new(EventKind::Kickoff, format!("touchback: {holder:?} takes the ball")).with("playerId", holder.0));
        }
    } else if let Some(occupant_id) = state.player_at(landing).map(|p| p.id) {
        let accurate = false;
        attempt_catch(state, occupant_id, accurate, dice, events, || true);
    } else {
        state.set_ball(Ball::OnGround(landing));
        events.push(GameEvent::new(EventKind::Bounce, format!("kicked ball rests at {landing:?}")));
    }

    let (a, b) = dice.roll_2d6();
    let event = kickoff_event_for_roll(a + b);
    events.push(GameEvent::new(EventKind::Kickoff, format!("kickoff table: {event:?}")).with("roll", (a + b) as i64));

    apply_kickoff_event(state, event, dice, events);
    reposition_hook(state, event);

    KickoffOutcome { event, touchback }
}

fn apply_kickoff_event(state: &mut GameState, event: KickoffEvent, dice: &mut dyn DiceSource, events: &mut EventLog) {
    match event {
        KickoffEvent::ChangingWeather => {
            let weather = roll_weather_table(dice);
            state.set_weather(weather);
            events.push(GameEvent::new(EventKind::WeatherChange, format!("weather changes to {weather:?}")));
        }
        KickoffEvent::Riot => {
            for side in [Side::Home, Side::Away] {
                let team = state.team_mut(side);
                team.turn_number = team.turn_number.saturating_sub(1).max(1);
            }
        }
        KickoffEvent::HighKick => {
            if let Ball::OnGround(square) = state.ball() {
                let nearest = state
                    .players_on_pitch(state.kicking_team().opponent())
                    .filter(|p| p.is_standing())
                    .map(|p| (p.position.expect("on-pitch player has a position").distance(square), p.id))
                    .min();
                if let Some((_, catcher_id)) = nearest {
                    attempt_catch(state, catcher_id, true, dice, events, || true);
                }
            }
        }
        KickoffEvent::CheeringFans => {
            let home_roll = dice.roll_d6();
            let away_roll = dice.roll_d6();
            let home_factor = state.team(Side::Home).score as i32 + home_roll as i32;
            let away_factor = state.team(Side::Away).score as i32 + away_roll as i32;
            let winner = if home_factor >= away_factor { Side::Home } else { Side::Away };
            let team = state.team_mut(winner);
            team.rerolls = (team.rerolls + 1).min(8);
            events.push(GameEvent::new(EventKind::Kickoff, format!("{winner:?} cheering fans bonus reroll")));
        }
        KickoffEvent::BrilliantCoaching => {
            let home_roll = dice.roll_d6();
            let away_roll = dice.roll_d6();
            let winner = if home_roll >= away_roll { Side::Home } else { Side::Away };
            let team = state.team_mut(winner);
            team.rerolls = (team.rerolls + 1).min(8);
            events.push(GameEvent::new(EventKind::Kickoff, format!("{winner:?} brilliant coaching bonus reroll")));
        }
        KickoffEvent::ThrowARock => {
            let receiving_side = state.kicking_team().opponent();
            let mut targets: Vec<PlayerId> = state.players_on_pitch(receiving_side).filter(|p| p.is_standing()).map(|p| p.id).collect();
            targets.sort();
            if !targets.is_empty() {
                let pick = (dice.roll_d6() as usize - 1) % targets.len();
                let victim = targets[pick];
                knock_down(state, victim, dice, events);
                injure(state, receiving_side, victim, &SkillSet::new(), dice, events, &|_| false);
            }
        }
        KickoffEvent::PitchInvasion => {
            let (lower, _) = if state.team(Side::Home).rerolls < state.team(Side::Away).rerolls {
                (Side::Home, Side::Away)
            } else if state.team(Side::Away).rerolls < state.team(Side::Home).rerolls {
                (Side::Away, Side::Home)
            } else {
                return;
            };
            let mut targets: Vec<PlayerId> = state
                .players_on_pitch(lower)
                .filter(|p| p.is_standing() && !p.skills.contains(&Skill::Dodge))
                .map(|p| p.id)
                .collect();
            targets.sort();
            if let Some(&victim) = targets.first() {
                if let Some(p) = state.player_mut(victim) {
                    p.state = crate::model::player::PlayerState::Stunned;
                }
                events.push(GameEvent::new(EventKind::KnockedDown, format!("{victim:?} stunned by pitch invasion")).with("playerId", victim.0));
            }
        }
        // Perfect Defense, Quick Snap, Blitz and Blitz! grant the receiving
        // or kicking coach an out-of-band repositioning/extra-action window
        // handled by `reposition_hook`/the driver rather than by mutating
        // state here directly.
        KickoffEvent::PerfectDefense | KickoffEvent::QuickSnap | KickoffEvent::Blitz | KickoffEvent::BlitzBang => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::model::player::{Player, PlayerStats, PlayerState};
    use crate::model::team::TeamState;

    fn base_state() -> GameState {
        let mut s = GameState::new(
            TeamState::new("home", "Home", "humans", Side::Home),
            TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Home,
        );
        s.set_phase(crate::state::Phase::Kickoff);
        s
    }

    fn standing(id: u32, side: Side, pos: Position) -> Player {
        let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
        let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p
    }

    #[test]
    fn scatter_behind_the_kicking_side_los_is_a_touchback() {
        let mut s = base_state();
        let receiver = standing(1, Side::Away, Position::new(20, 7));
        s.players.insert(receiver.id, receiver);
        // Home kicks; d8=7 (west) at distance 6 from the away-half target
        // drags the ball behind the x=12/13 line of scrimmage.
        let mut dice = ScriptedDice::new().with_d8([7, 1]).with_d6([6]).with_d6([2, 2]);
        let mut events = EventLog::new();
        let outcome = resolve_kickoff(&mut s, None, &mut dice, &mut events, |_, _| {});
        assert!(outcome.touchback);
        assert_eq!(s.ball(), Ball::Held(PlayerId(1)));
    }

    #[test]
    fn riot_decrements_both_turn_counters_clamped_at_one() {
        let mut s = base_state();
        s.team_mut(Side::Home).turn_number = 1;
        s.team_mut(Side::Away).turn_number = 3;
        let mut dice = ScriptedDice::new().with_d8([1]).with_d6([8, 2, 2]);
        let mut events = EventLog::new();
        let outcome = resolve_kickoff(&mut s, None, &mut dice, &mut events, |_, _| {});
        assert_eq!(outcome.event, KickoffEvent::Riot);
        assert_eq!(s.team(Side::Home).turn_number, 1);
        assert_eq!(s.team(Side::Away).turn_number, 2);
    }
}
