//! Ball resolver (spec §4.7): pickup, catch, bounce, drop.

use crate::dice::DiceSource;
use crate::engine::reroll::{attempt_roll, clamp_target};
use crate::engine::scatter::bounce_once;
use crate::engine::tacklezone::tacklezones_on;
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::{PlayerId, PlayerState};
use crate::model::skills::{RollKind, Skill};
use crate::state::GameState;

pub fn pickup_target(agility: u8, has_sure_hands: bool, tacklezones: u32) -> u8 {
    let modifier = if has_sure_hands { 1 } else { 0 };
    clamp_target(7 - agility as i32 - modifier + tacklezones as i32)
}

pub fn catch_target(agility: u8, tacklezones: u32, accurate_modifier: bool) -> u8 {
    let modifier = if accurate_modifier { 1 } else { 0 };
    clamp_target(7 - agility as i32 + tacklezones as i32 - modifier)
}

/// Bounce chains (failed catch → bounce → lands on another standing player
/// → catch again → ...) are bounded the same way push chains are in the
/// block resolver: a depth cap rather than unbounded recursion.
const MAX_BOUNCE_CATCH_DEPTH: u8 = 8;

/// Standing player steps onto a loose ball. On success the ball becomes
/// `Held`; on failure it bounces from the player's square. Returns whether
/// the pickup succeeded.
pub fn attempt_pickup(
    state: &mut GameState,
    player_id: PlayerId,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
) -> bool {
    let (side, square, agility, skills) = {
        let p = state.player(player_id).expect("pickup: player must exist");
        (p.team_side, p.position.expect("pickup: player must be on pitch"), p.stats.agility, p.skills.clone())
    };
    let tz = tacklezones_on(state, square, side);
    let target = pickup_target(agility, skills.contains(&Skill::SureHands), tz);
    let team_on_turn = state.active_team() == side;

    let team = state.team_mut(side);
    let attempt = attempt_roll(
        RollKind::Pickup,
        target,
        player_id,
        &skills,
        team,
        team_on_turn,
        dice,
        events,
        accept_team_reroll,
    );

    events.push(
        GameEvent::new(EventKind::Pickup, format!("{player_id:?} picks up the ball at {square:?}"))
            .with("success", attempt.success)
            .with("target", target as i64)
            .with("playerId", player_id.0),
    );

    if attempt.success {
        state.set_ball(Ball::Held(player_id));
    } else {
        let landing = bounce_once(dice, square);
        resolve_bounce_landing(state, landing, dice, events);
    }
    attempt.success
}

/// Catch resolution after a pass/hand-off/deflection lands on a standing
/// player. On failure the ball bounces from the catcher's square.
pub fn attempt_catch(
    state: &mut GameState,
    player_id: PlayerId,
    accurate_modifier: bool,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
) -> bool {
    attempt_catch_at_depth(state, player_id, accurate_modifier, dice, events, accept_team_reroll, 0)
}

fn attempt_catch_at_depth(
    state: &mut GameState,
    player_id: PlayerId,
    accurate_modifier: bool,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
    depth: u8,
) -> bool {
    let (side, square, agility, skills) = {
        let p = state.player(player_id).expect("catch: player must exist");
        (p.team_side, p.position.expect("catch: player must be on pitch"), p.stats.agility, p.skills.clone())
    };
    let tz = tacklezones_on(state, square, side);
    let target = catch_target(agility, tz, accurate_modifier);
    let team_on_turn = state.active_team() == side;

    let team = state.team_mut(side);
    let attempt = attempt_roll(
        RollKind::Catch,
        target,
        player_id,
        &skills,
        team,
        team_on_turn,
        dice,
        events,
        accept_team_reroll,
    );

    events.push(
        GameEvent::new(EventKind::Catch, format!("{player_id:?} attempts to catch at {square:?}"))
            .with("success", attempt.success)
            .with("target", target as i64)
            .with("playerId", player_id.0),
    );

    if attempt.success {
        state.set_ball(Ball::Held(player_id));
    } else {
        let landing = bounce_once(dice, square);
        resolve_bounce_landing_at_depth(state, landing, dice, events, depth + 1);
    }
    attempt.success
}

/// The ball becomes loose at `square` and then bounces once — used when a
/// carrier is knocked down or dodges badly.
pub fn drop_ball(state: &mut GameState, square: crate::geometry::Position, dice: &mut dyn DiceSource, events: &mut EventLog) {
    events.push(GameEvent::new(EventKind::Bounce, format!("ball dropped at {square:?}")));
    let landing = bounce_once(dice, square);
    resolve_bounce_landing(state, landing, dice, events);
}

/// After a scatter/throw-in lands on a standing player, a catch is
/// triggered (spec §4.7); a failed catch bounces again, capped at
/// [`MAX_BOUNCE_CATCH_DEPTH`] to bound pathological chains. Otherwise the
/// ball simply rests on the ground.
pub(crate) fn resolve_bounce_landing(state: &mut GameState, landing: crate::geometry::Position, dice: &mut dyn DiceSource, events: &mut EventLog) {
    resolve_bounce_landing_at_depth(state, landing, dice, events, 0);
}

fn resolve_bounce_landing_at_depth(
    state: &mut GameState,
    landing: crate::geometry::Position,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    depth: u8,
) {
    let standing_occupant = state.player_at(landing).filter(|p| p.state == PlayerState::Standing).map(|p| p.id);
    match standing_occupant {
        Some(catcher_id) if depth < MAX_BOUNCE_CATCH_DEPTH => {
            attempt_catch_at_depth(state, catcher_id, false, dice, events, || true, depth);
        }
        Some(_) => {
            // Safety valve only, never expected with real dice: rest rather
            // than recurse further.
            state.set_ball(Ball::OnGround(landing));
            events.push(GameEvent::new(EventKind::Bounce, format!("ball rests at {landing:?} (bounce-catch cap reached)")));
        }
        None => {
            state.set_ball(Ball::OnGround(landing));
            events.push(GameEvent::new(EventKind::Bounce, format!("ball rests at {landing:?}")));
        }
    }
}
