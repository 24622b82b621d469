//! Pass resolver (spec §4.8): range bands, accuracy, interception, scatter
//! on a miss, and the chained catch on landing.

use crate::dice::DiceSource;
use crate::engine::ball_resolver::{attempt_catch, resolve_bounce_landing};
use crate::engine::reroll::{attempt_roll, clamp_target};
use crate::engine::scatter::{scatter_once, throw_in};
use crate::engine::tacklezone::tacklezones_on;
use crate::geometry::Position;
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::PlayerId;
use crate::model::skills::RollKind;
use crate::state::{GameState, Weather};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassRange {
    Quick,
    Short,
    Long,
    LongBomb,
}

pub fn pass_range(distance: i32) -> Option<PassRange> {
    match distance {
        0..=3 => Some(PassRange::Quick),
        4..=6 => Some(PassRange::Short),
        7..=10 => Some(PassRange::Long),
        11..=13 => Some(PassRange::LongBomb),
        _ => None,
    }
}

fn range_modifier(range: PassRange) -> i32 {
    match range {
        PassRange::Quick => 1,
        PassRange::Short => 0,
        PassRange::Long => -1,
        PassRange::LongBomb => -2,
    }
}

fn weather_modifier(weather: Weather) -> i32 {
    match weather {
        Weather::PouringRain => 1,
        _ => 0,
    }
}

pub fn accuracy_target(agility: u8, range: PassRange, tacklezones: u32, weather: Weather) -> u8 {
    clamp_target(7 - agility as i32 - range_modifier(range) + tacklezones as i32 + weather_modifier(weather))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Intercepted(PlayerId),
    Fumble,
    Accurate,
    Inaccurate,
}

/// The squares strictly between `from` and `to`, up to and including `to`,
/// sampled along the straight line at unit steps of the dominant axis.
fn line_squares(from: Position, to: Position) -> Vec<Position> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return Vec::new();
    }
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            Position::new(
                (from.x as f64 + dx as f64 * t).round() as i32,
                (from.y as f64 + dy as f64 * t).round() as i32,
            )
        })
        .collect()
}

/// The standing opposing player threatening the pass lane, if any — closest
/// to the thrower, ties broken lexicographically.
pub fn find_interceptor(state: &GameState, thrower_id: PlayerId, target: Position) -> Option<PlayerId> {
    let thrower = state.player(thrower_id)?;
    let thrower_pos = thrower.position?;
    let thrower_side = thrower.team_side;

    let mut candidates: Vec<(Position, PlayerId)> = line_squares(thrower_pos, target)
        .into_iter()
        .filter_map(|pos| state.player_at(pos).map(|p| (pos, p)))
        .filter(|(_, p)| p.team_side != thrower_side && p.is_standing())
        .map(|(pos, p)| (pos, p.id))
        .collect();

    candidates.sort_by_key(|(pos, _)| (thrower_pos.distance(*pos), pos.x, pos.y));
    candidates.first().map(|(_, id)| *id)
}

/// Resolves a PASS action once legality (range, line of sight setup) has
/// already been checked by the caller.
pub fn resolve_pass(
    state: &mut GameState,
    thrower_id: PlayerId,
    target: Position,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
) -> PassOutcome {
    let (thrower_side, thrower_pos, agility, skills) = {
        let p = state.player(thrower_id).expect("pass: thrower must exist");
        (p.team_side, p.position.expect("pass: thrower must be on pitch"), p.stats.agility, p.skills.clone())
    };

    if let Some(interceptor_id) = find_interceptor(state, thrower_id, target) {
        let (interceptor_side, interceptor_pos, interceptor_agility, interceptor_skills) = {
            let p = state.player(interceptor_id).expect("interceptor must exist");
            (p.team_side, p.position.expect("interceptor must be on pitch"), p.stats.agility, p.skills.clone())
        };
        let tz = tacklezones_on(state, interceptor_pos, interceptor_side);
        let int_target = clamp_target(7 - interceptor_agility as i32 + 2 + tz as i32);
        let team_on_turn = state.active_team() == interceptor_side;
        let team = state.team_mut(interceptor_side);
        let attempt = attempt_roll(
            RollKind::Catch,
            int_target,
            interceptor_id,
            &interceptor_skills,
            team,
            team_on_turn,
            dice,
            events,
            || true,
        );
        if attempt.success {
            state.set_ball(Ball::Held(interceptor_id));
            events.push(
                GameEvent::new(EventKind::Turnover, format!("{interceptor_id:?} intercepts the pass"))
                    .with("playerId", interceptor_id.0),
            );
            return PassOutcome::Intercepted(interceptor_id);
        }
    }

    let first = dice.roll_d6();
    events.push(
        GameEvent::new(EventKind::Pass, format!("{thrower_id:?} throws toward {target:?}"))
            .with("roll", first as i64)
            .with("playerId", thrower_id.0),
    );

    if first == 1 {
        events.push(GameEvent::new(EventKind::Turnover, "pass fumbled"));
        let landed = scatter_once(dice, thrower_pos);
        let landing = if landed.is_on_pitch() { landed } else { throw_in(dice, landed) };
        resolve_bounce_landing(state, landing, dice, events);
        return PassOutcome::Fumble;
    }

    let tz = tacklezones_on(state, thrower_pos, thrower_side);
    let range = pass_range(thrower_pos.distance(target)).unwrap_or(PassRange::LongBomb);
    let weather = state.weather();
    let acc_target = accuracy_target(agility, range, tz, weather);

    if first >= acc_target {
        resolve_landing(state, target, true, dice, events, accept_team_reroll);
        PassOutcome::Accurate
    } else {
        let mut landing = target;
        for _ in 0..3 {
            landing = scatter_once(dice, landing);
        }
        if !landing.is_on_pitch() {
            landing = throw_in(dice, landing);
        }
        resolve_landing(state, landing, false, dice, events, accept_team_reroll);
        PassOutcome::Inaccurate
    }
}

fn resolve_landing(
    state: &mut GameState,
    landing: Position,
    accurate: bool,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
) {
    match state.player_at(landing) {
        Some(p) if p.is_standing() => {
            let catcher = p.id;
            attempt_catch(state, catcher, accurate, dice, events, accept_team_reroll);
        }
        _ => {
            state.set_ball(Ball::OnGround(landing));
            events.push(GameEvent::new(EventKind::Bounce, format!("pass rests at {landing:?}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::geometry::Side;
    use crate::model::player::{Player, PlayerState, PlayerStats};
    use crate::model::skills::SkillSet;
    use crate::model::team::TeamState;

    fn base_state() -> GameState {
        GameState::new(
            TeamState::new("home", "Home", "humans", Side::Home),
            TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Home,
        )
    }

    fn standing(id: u32, side: Side, pos: Position, agility: u8) -> Player {
        let stats = PlayerStats { movement: 6, strength: 3, agility, armour: 8 };
        let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p
    }

    #[test]
    fn short_pass_with_accurate_catch_succeeds() {
        let mut s = base_state();
        s.set_phase(crate::state::Phase::Play);
        s.set_active_team(Side::Home);
        let thrower = standing(1, Side::Home, Position::new(5, 5), 3);
        let catcher = standing(2, Side::Home, Position::new(10, 5), 3);
        s.players.insert(thrower.id, thrower);
        s.players.insert(catcher.id, catcher);
        let mut dice = ScriptedDice::new().with_d6([5, 4]);
        let mut events = EventLog::new();
        let outcome = resolve_pass(&mut s, PlayerId(1), Position::new(10, 5), &mut dice, &mut events, || true);
        assert_eq!(outcome, PassOutcome::Accurate);
        assert_eq!(s.ball(), Ball::Held(PlayerId(2)));
    }

    #[test]
    fn roll_of_one_is_always_a_fumble() {
        let mut s = base_state();
        let thrower = standing(1, Side::Home, Position::new(5, 5), 3);
        s.players.insert(thrower.id, thrower);
        let mut dice = ScriptedDice::new().with_d6([1]).with_d8([3]);
        let mut events = EventLog::new();
        let outcome = resolve_pass(&mut s, PlayerId(1), Position::new(10, 5), &mut dice, &mut events, || true);
        assert_eq!(outcome, PassOutcome::Fumble);
    }

    #[test]
    fn standing_enemy_on_the_pass_lane_may_intercept() {
        let mut s = base_state();
        s.set_active_team(Side::Away);
        let thrower = standing(1, Side::Home, Position::new(5, 5), 3);
        let interceptor = standing(2, Side::Away, Position::new(7, 5), 3);
        s.players.insert(thrower.id, thrower);
        s.players.insert(interceptor.id, interceptor);
        let mut dice = ScriptedDice::new().with_d6([6]);
        let mut events = EventLog::new();
        let outcome = resolve_pass(&mut s, PlayerId(1), Position::new(10, 5), &mut dice, &mut events, || true);
        assert_eq!(outcome, PassOutcome::Intercepted(PlayerId(2)));
        assert_eq!(s.ball(), Ball::Held(PlayerId(2)));
    }
}
