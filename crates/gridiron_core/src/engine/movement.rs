//! Movement resolver (spec §4.5): the MOVE action, stepping along the
//! pathfinder's route with dodge/GFI rolls at the squares that need them.

use crate::dice::DiceSource;
use crate::engine::ball_resolver::{attempt_pickup, drop_ball};
use crate::engine::pathfinder::find_path;
use crate::engine::reroll::{attempt_roll, clamp_target};
use crate::engine::tacklezone::tacklezones_on;
use crate::geometry::Position;
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::{PlayerId, PlayerState};
use crate::model::skills::{RollKind, Skill, SkillSet};
use crate::state::{GameState, Weather};

fn dodge_target(agility: u8, skills: &SkillSet, assisting_tacklezones: u32) -> u8 {
    let mods = [Skill::Stunty, Skill::Titchy, Skill::BreakTackle]
        .iter()
        .filter(|s| skills.contains(s))
        .count() as i32;
    clamp_target(7 - agility as i32 - mods + assisting_tacklezones as i32)
}

fn gfi_target(weather: Weather) -> u8 {
    if weather == Weather::Blizzard {
        3
    } else {
        2
    }
}

pub struct MoveResult {
    pub turnover: bool,
    pub touchdown: bool,
    pub final_position: Position,
}

/// Resolves a MOVE action once legality (ownership, `!hasMoved`, on-pitch
/// destination, path existence) has already been checked by the caller.
pub fn resolve_move(
    state: &mut GameState,
    player_id: PlayerId,
    target: Position,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl Fn() -> bool,
) -> MoveResult {
    let side = state.player(player_id).expect("move: player must exist").team_side;

    let starts_prone = state.player(player_id).map(|p| p.state == PlayerState::Prone).unwrap_or(false);
    if starts_prone {
        if let Some(p) = state.player_mut(player_id) {
            p.state = PlayerState::Standing;
            p.flags.movement_remaining = p.flags.movement_remaining.saturating_sub(3);
        }
        events.push(GameEvent::new(EventKind::Move, format!("{player_id:?} stands up")).with("playerId", player_id.0));
    }

    let path = find_path(state, player_id, target).unwrap_or_default();
    let mut turnover = false;
    let mut touchdown = false;
    let mut final_position = state.player(player_id).and_then(|p| p.position).unwrap_or(target);

    for step in path {
        if turnover {
            break;
        }

        if step.requires_dodge {
            let (agility, skills) = {
                let p = state.player(player_id).expect("move: player vanished mid-path");
                (p.stats.agility, p.skills.clone())
            };
            let assisting = tacklezones_on(state, step.position, side);
            let tgt = dodge_target(agility, &skills, assisting);
            let team_on_turn = state.active_team() == side;
            let team = state.team_mut(side);
            let attempt = attempt_roll(
                RollKind::Dodge,
                tgt,
                player_id,
                &skills,
                team,
                team_on_turn,
                dice,
                events,
                &accept_team_reroll,
            );
            move_to(state, player_id, step.position);
            final_position = step.position;
            events.push(
                GameEvent::new(EventKind::Dodge, format!("{player_id:?} dodges to {:?}", step.position))
                    .with("success", attempt.success)
                    .with("playerId", player_id.0),
            );
            if !attempt.success {
                fall_prone(state, player_id, dice, events);
                turnover = true;
                continue;
            }
        } else if step.requires_gfi {
            let tgt = gfi_target(state.weather());
            let skills = state.player(player_id).expect("move: player vanished mid-path").skills.clone();
            let team_on_turn = state.active_team() == side;
            let team = state.team_mut(side);
            let attempt = attempt_roll(RollKind::Gfi, tgt, player_id, &skills, team, team_on_turn, dice, events, &accept_team_reroll);
            move_to(state, player_id, step.position);
            final_position = step.position;
            events.push(
                GameEvent::new(EventKind::Gfi, format!("{player_id:?} goes for it to {:?}", step.position))
                    .with("success", attempt.success)
                    .with("playerId", player_id.0),
            );
            if !attempt.success {
                fall_prone(state, player_id, dice, events);
                turnover = true;
                continue;
            }
        } else {
            move_to(state, player_id, step.position);
            final_position = step.position;
        }

        if let Some(p) = state.player_mut(player_id) {
            p.flags.movement_remaining = p.flags.movement_remaining.saturating_sub(1);
        }
        events.push(GameEvent::new(EventKind::Move, format!("{player_id:?} moves to {:?}", step.position)).with("playerId", player_id.0));

        if state.ball() == Ball::OnGround(step.position) {
            let picked_up = attempt_pickup(state, player_id, dice, events, &accept_team_reroll);
            if !picked_up {
                turnover = true;
            }
        }

        if state.ball() == Ball::Held(player_id) && step.position.is_opposing_end_zone(side) {
            state.set_turnover_pending(false);
            touchdown = true;
            break;
        }
    }

    if let Some(p) = state.player_mut(player_id) {
        p.flags.has_moved = true;
    }

    MoveResult { turnover, touchdown, final_position }
}

fn move_to(state: &mut GameState, player_id: PlayerId, pos: Position) {
    if let Some(p) = state.player_mut(player_id) {
        p.position = Some(pos);
    }
}

fn fall_prone(state: &mut GameState, player_id: PlayerId, dice: &mut dyn DiceSource, events: &mut EventLog) {
    let was_carrier = state.ball() == Ball::Held(player_id);
    let pos = state.player(player_id).and_then(|p| p.position);
    if let Some(p) = state.player_mut(player_id) {
        p.state = PlayerState::Prone;
    }
    if was_carrier {
        if let Some(pos) = pos {
            drop_ball(state, pos, dice, events);
        }
    }
}
