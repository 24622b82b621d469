//! Rules engine (spec §4.12): pure legality queries and the `Action`
//! request type the action resolver dispatches on. No mutation happens
//! here — `available_actions`/`valid_moves_for`/etc. are read-only and must
//! stay consistent with what [`crate::engine::action_resolver::resolve`]
//! actually accepts (§8's `validMovesFor` ⊆ dispatchable property).

use crate::engine::pathfinder::find_path;
use crate::engine::strength::effective_strengths;
use crate::error::{EngineError, Result};
use crate::geometry::{adjacent, Position, LOS_X_HIGH, LOS_X_LOW};
use crate::model::player::{Player, PlayerId, PlayerState};
use crate::model::skills::Skill;
use crate::state::{GameState, Phase};

/// The top-level action tag and its payload, matching the §6 action
/// request table one-to-one (`SETUP_PLAYER`, `MOVE`, `BLOCK`/`BLITZ`,
/// `MULTIPLE_BLOCK`, `PASS`, `HAND_OFF`/`FOUL`, `END_SETUP`/`END_TURN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetupPlayer { player_id: PlayerId, x: i32, y: i32 },
    Move { player_id: PlayerId, x: i32, y: i32 },
    Block { player_id: PlayerId, target_id: PlayerId },
    Blitz { player_id: PlayerId, target_id: PlayerId },
    MultipleBlock { player_id: PlayerId, target_id: PlayerId, target_id2: PlayerId },
    Pass { player_id: PlayerId, target_x: i32, target_y: i32 },
    HandOff { player_id: PlayerId, target_id: PlayerId },
    Foul { player_id: PlayerId, target_id: PlayerId },
    EndSetup,
    EndTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOption {
    pub position: Position,
    pub dodges: u32,
    pub gfis: u32,
}

fn active_player<'a>(state: &'a GameState, player_id: PlayerId) -> Result<&'a Player> {
    let player = state.player(player_id).ok_or(EngineError::PlayerNotFound(player_id))?;
    if player.team_side != state.active_team() {
        return Err(EngineError::NotActiveTeam(player_id));
    }
    Ok(player)
}

fn require_on_pitch(player: &Player) -> Result<()> {
    if !player.is_on_pitch() {
        return Err(EngineError::PlayerNotOnPitch(player.id));
    }
    Ok(())
}

fn require_phase(state: &GameState, phase: Phase) -> Result<()> {
    if state.phase() != phase {
        return Err(EngineError::WrongPhase(state.phase()));
    }
    Ok(())
}

pub(crate) fn check_move_legal(state: &GameState, player_id: PlayerId, dest: Position) -> Result<()> {
    require_phase(state, Phase::Play)?;
    let player = active_player(state, player_id)?;
    require_on_pitch(player)?;
    if player.flags.has_moved {
        return Err(EngineError::AlreadyMoved(player_id));
    }
    if !dest.is_on_pitch() {
        return Err(EngineError::OffPitch(dest));
    }
    if state.player_at(dest).is_some() {
        return Err(EngineError::SquareOccupied(dest));
    }
    if find_path(state, player_id, dest).is_none() {
        return Err(EngineError::NoPath { from: player.position.expect("on-pitch player has a position"), to: dest });
    }
    Ok(())
}

/// Every square a move to would not raise `IllegalAction`, annotated with
/// the dodge/GFI count the pathfinder's returned route would attempt.
pub fn valid_moves_for(state: &GameState, player_id: PlayerId) -> Vec<MoveOption> {
    let player = match state.player(player_id) {
        Some(p) if p.team_side == state.active_team() && p.is_on_pitch() && !p.flags.has_moved => p,
        _ => return Vec::new(),
    };
    let origin = match player.position {
        Some(p) => p,
        None => return Vec::new(),
    };
    let cap = player.flags.movement_remaining.saturating_add(2) as i32;

    let mut options = Vec::new();
    for dx in -cap..=cap {
        for dy in -cap..=cap {
            let dest = origin.translated(dx, dy);
            if dest == origin || !dest.is_on_pitch() || state.player_at(dest).is_some() {
                continue;
            }
            if let Some(path) = find_path(state, player_id, dest) {
                let dodges = path.iter().filter(|s| s.requires_dodge).count() as u32;
                let gfis = path.iter().filter(|s| s.requires_gfi).count() as u32;
                options.push(MoveOption { position: dest, dodges, gfis });
            }
        }
    }
    options
}

pub(crate) fn check_block_legal(
    state: &GameState,
    attacker_id: PlayerId,
    defender_id: PlayerId,
    is_blitz: bool,
) -> Result<()> {
    require_phase(state, Phase::Play)?;
    let attacker = active_player(state, attacker_id)?;
    require_on_pitch(attacker)?;
    if !attacker.is_standing() {
        return Err(EngineError::PlayerNotOnPitch(attacker_id));
    }
    if attacker.flags.has_acted {
        return Err(EngineError::AlreadyActed(attacker_id));
    }
    let defender = state.player(defender_id).ok_or(EngineError::PlayerNotFound(defender_id))?;
    if defender.team_side == attacker.team_side || !defender.is_standing() {
        return Err(EngineError::TargetNotStandingEnemy(defender_id));
    }
    let (attacker_pos, defender_pos) = (
        attacker.position.expect("on-pitch player has a position"),
        defender.position.expect("on-pitch player has a position"),
    );
    if !attacker_pos.is_adjacent(defender_pos) {
        return Err(EngineError::NotAdjacent(attacker_id));
    }
    if is_blitz {
        if attacker.flags.has_moved {
            return Err(EngineError::AlreadyMoved(attacker_id));
        }
        if state.active_team_state().blitz_used_this_turn {
            return Err(EngineError::BlitzAlreadyUsed);
        }
    }
    Ok(())
}

pub(crate) fn check_multiple_block_legal(
    state: &GameState,
    attacker_id: PlayerId,
    target_id: PlayerId,
    target_id2: PlayerId,
) -> Result<()> {
    let attacker = state.player(attacker_id).ok_or(EngineError::PlayerNotFound(attacker_id))?;
    if !attacker.skills.contains(&Skill::MultipleBlock) {
        return Err(EngineError::MissingSkill("MultipleBlock"));
    }
    check_block_legal(state, attacker_id, target_id, false)?;
    check_block_legal(state, attacker_id, target_id2, false)?;
    Ok(())
}

/// Standing enemies adjacent to `player_id` — the common target set for
/// BLOCK and BLITZ.
pub fn block_targets_for(state: &GameState, player_id: PlayerId) -> Vec<PlayerId> {
    let player = match state.player(player_id) {
        Some(p) if p.team_side == state.active_team() && p.is_standing() => p,
        _ => return Vec::new(),
    };
    let pos = match player.position {
        Some(p) => p,
        None => return Vec::new(),
    };
    adjacent(pos)
        .into_iter()
        .filter_map(|sq| state.player_at(sq))
        .filter(|p| p.team_side != player.team_side && p.is_standing())
        .map(|p| p.id)
        .collect()
}

pub(crate) fn check_pass_legal(state: &GameState, thrower_id: PlayerId, target: Position) -> Result<()> {
    require_phase(state, Phase::Play)?;
    let thrower = active_player(state, thrower_id)?;
    require_on_pitch(thrower)?;
    if !thrower.is_standing() {
        return Err(EngineError::PlayerNotOnPitch(thrower_id));
    }
    if thrower.flags.has_acted {
        return Err(EngineError::AlreadyActed(thrower_id));
    }
    if state.active_team_state().pass_used_this_turn {
        return Err(EngineError::PassAlreadyUsed);
    }
    if state.ball().carrier() != Some(thrower_id) {
        return Err(EngineError::InvalidParams("thrower is not holding the ball".into()));
    }
    if !target.is_on_pitch() {
        return Err(EngineError::OffPitch(target));
    }
    let distance = thrower.position.expect("on-pitch player has a position").distance(target);
    if crate::engine::pass_resolver::pass_range(distance).is_none() {
        return Err(EngineError::InvalidParams(format!("{distance} squares is beyond long bomb range")));
    }
    Ok(())
}

/// Every on-pitch square within long-bomb range (the farthest named band)
/// of the thrower, regardless of what stands there — accuracy/interception
/// are resolved by the pass resolver, not gated here.
pub fn pass_targets_for(state: &GameState, player_id: PlayerId) -> Vec<Position> {
    let thrower = match state.player(player_id) {
        Some(p) if p.team_side == state.active_team() && state.ball().carrier() == Some(player_id) => p,
        _ => return Vec::new(),
    };
    let origin = match thrower.position {
        Some(p) => p,
        None => return Vec::new(),
    };
    const MAX_RANGE: i32 = 13;
    let mut targets = Vec::new();
    for dx in -MAX_RANGE..=MAX_RANGE {
        for dy in -MAX_RANGE..=MAX_RANGE {
            let dest = origin.translated(dx, dy);
            if dest == origin || !dest.is_on_pitch() {
                continue;
            }
            if crate::engine::pass_resolver::pass_range(origin.distance(dest)).is_some() {
                targets.push(dest);
            }
        }
    }
    targets
}

pub(crate) fn check_handoff_legal(state: &GameState, giver_id: PlayerId, receiver_id: PlayerId) -> Result<()> {
    require_phase(state, Phase::Play)?;
    let giver = active_player(state, giver_id)?;
    require_on_pitch(giver)?;
    if state.ball().carrier() != Some(giver_id) {
        return Err(EngineError::InvalidParams("giver is not holding the ball".into()));
    }
    let receiver = state.player(receiver_id).ok_or(EngineError::PlayerNotFound(receiver_id))?;
    if receiver.team_side != giver.team_side || !receiver.is_standing() {
        return Err(EngineError::InvalidParams("hand-off target must be a standing teammate".into()));
    }
    let (giver_pos, receiver_pos) = (
        giver.position.expect("on-pitch player has a position"),
        receiver.position.expect("on-pitch player has a position"),
    );
    if !giver_pos.is_adjacent(receiver_pos) {
        return Err(EngineError::NotAdjacent(giver_id));
    }
    Ok(())
}

/// Standing teammates adjacent to the current ball carrier.
pub fn handoff_targets_for(state: &GameState, player_id: PlayerId) -> Vec<PlayerId> {
    if state.ball().carrier() != Some(player_id) {
        return Vec::new();
    }
    let giver = match state.player(player_id) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let pos = match giver.position {
        Some(p) => p,
        None => return Vec::new(),
    };
    adjacent(pos)
        .into_iter()
        .filter_map(|sq| state.player_at(sq))
        .filter(|p| p.team_side == giver.team_side && p.is_standing() && p.id != player_id)
        .map(|p| p.id)
        .collect()
}

pub(crate) fn check_foul_legal(state: &GameState, fouler_id: PlayerId, target_id: PlayerId) -> Result<()> {
    require_phase(state, Phase::Play)?;
    let fouler = active_player(state, fouler_id)?;
    require_on_pitch(fouler)?;
    if state.active_team_state().foul_used_this_turn {
        return Err(EngineError::FoulAlreadyUsed);
    }
    let target = state.player(target_id).ok_or(EngineError::PlayerNotFound(target_id))?;
    let down = matches!(target.state, PlayerState::Prone | PlayerState::Stunned);
    if target.team_side == fouler.team_side || !down {
        return Err(EngineError::InvalidParams("foul target must be a downed enemy".into()));
    }
    let (fouler_pos, target_pos) = (
        fouler.position.expect("on-pitch player has a position"),
        target.position.expect("on-pitch player has a position"),
    );
    if !fouler_pos.is_adjacent(target_pos) {
        return Err(EngineError::NotAdjacent(fouler_id));
    }
    Ok(())
}

/// Prone or stunned enemies adjacent to `player_id`.
pub fn foul_targets_for(state: &GameState, player_id: PlayerId) -> Vec<PlayerId> {
    let fouler = match state.player(player_id) {
        Some(p) if p.team_side == state.active_team() => p,
        _ => return Vec::new(),
    };
    let pos = match fouler.position {
        Some(p) => p,
        None => return Vec::new(),
    };
    adjacent(pos)
        .into_iter()
        .filter_map(|sq| state.player_at(sq))
        .filter(|p| p.team_side != fouler.team_side && matches!(p.state, PlayerState::Prone | PlayerState::Stunned))
        .map(|p| p.id)
        .collect()
}

pub(crate) fn check_setup_player_legal(state: &GameState, player_id: PlayerId, dest: Position) -> Result<()> {
    require_phase(state, Phase::Setup)?;
    let player = state.player(player_id).ok_or(EngineError::PlayerNotFound(player_id))?;
    if player.team_side != state.active_team() {
        return Err(EngineError::NotActiveTeam(player_id));
    }
    if player.state.is_on_pitch() {
        return Err(EngineError::InvalidParams("player is already on the pitch".into()));
    }
    if !dest.is_on_pitch() {
        return Err(EngineError::OffPitch(dest));
    }
    if state.player_at(dest).is_some() {
        return Err(EngineError::SquareOccupied(dest));
    }
    let own_half_ok = match player.team_side {
        crate::geometry::Side::Home => dest.x <= LOS_X_LOW,
        crate::geometry::Side::Away => dest.x >= LOS_X_HIGH,
    };
    if !own_half_ok {
        return Err(EngineError::InvalidFormation("setup square is not on the team's own half".into()));
    }
    Ok(())
}

/// §6 formation constraints: at least 3 players on the line of scrimmage,
/// at most 2 per wide zone. Checked once per side at `END_SETUP`.
pub fn formation_is_legal(state: &GameState, side: crate::geometry::Side) -> bool {
    let on_pitch: Vec<&Player> = state.players_on_pitch(side).collect();
    if on_pitch.is_empty() {
        return true;
    }
    let los_count = on_pitch.iter().filter(|p| p.position.map(|pos| pos.is_line_of_scrimmage()).unwrap_or(false)).count();
    if los_count < 3 {
        return false;
    }
    let top_wide = on_pitch.iter().filter(|p| p.position.map(|pos| pos.y < 4).unwrap_or(false)).count();
    let bottom_wide = on_pitch.iter().filter(|p| p.position.map(|pos| pos.y >= 11).unwrap_or(false)).count();
    top_wide <= 2 && bottom_wide <= 2
}

/// Every legal `(Action)` request for the side currently on turn — what a
/// `Coach::decideAction` chooses from (spec §6).
pub fn available_actions(state: &GameState) -> Vec<Action> {
    let mut actions = Vec::new();

    match state.phase() {
        Phase::Setup => {
            actions.push(Action::EndSetup);
            return actions;
        }
        Phase::Play => {}
        _ => return actions,
    }

    let side = state.active_team();
    for player in state.players_on_pitch(side) {
        if !player.flags.has_moved {
            for opt in valid_moves_for(state, player.id) {
                actions.push(Action::Move { player_id: player.id, x: opt.position.x, y: opt.position.y });
            }
        }
        if !player.flags.has_acted && player.is_standing() {
            for target in block_targets_for(state, player.id) {
                actions.push(Action::Block { player_id: player.id, target_id: target });
                if !player.flags.has_moved && !state.active_team_state().blitz_used_this_turn {
                    actions.push(Action::Blitz { player_id: player.id, target_id: target });
                }
            }
            if player.skills.contains(&Skill::MultipleBlock) {
                let targets = block_targets_for(state, player.id);
                for i in 0..targets.len() {
                    for j in (i + 1)..targets.len() {
                        actions.push(Action::MultipleBlock {
                            player_id: player.id,
                            target_id: targets[i],
                            target_id2: targets[j],
                        });
                    }
                }
            }
            if !state.active_team_state().pass_used_this_turn && state.ball().carrier() == Some(player.id) {
                for target in pass_targets_for(state, player.id) {
                    actions.push(Action::Pass { player_id: player.id, target_x: target.x, target_y: target.y });
                }
            }
            if state.ball().carrier() == Some(player.id) {
                for target in handoff_targets_for(state, player.id) {
                    actions.push(Action::HandOff { player_id: player.id, target_id: target });
                }
            }
            if !state.active_team_state().foul_used_this_turn {
                for target in foul_targets_for(state, player.id) {
                    actions.push(Action::Foul { player_id: player.id, target_id: target });
                }
            }
        }
    }

    actions.push(Action::EndTurn);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Side;
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

    fn standing(id: u32, side: Side, pos: Position, movement: u8) -> Player {
        let stats = PlayerStats { movement, strength: 3, agility: 3, armour: 8 };
        let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p.flags.movement_remaining = movement;
        p
    }

    #[test]
    fn valid_moves_exclude_occupied_and_off_pitch_squares() {
        let mut s = base_state();
        let mover = standing(1, Side::Home, Position::new(5, 5), 2);
        let blocker = standing(2, Side::Home, Position::new(6, 5), 2);
        s.players.insert(mover.id, mover);
        s.players.insert(blocker.id, blocker);
        let moves = valid_moves_for(&s, PlayerId(1));
        assert!(!moves.iter().any(|m| m.position == Position::new(6, 5)));
        assert!(moves.iter().all(|m| m.position.is_on_pitch()));
    }

    #[test]
    fn every_valid_move_is_accepted_by_check_move_legal() {
        let mut s = base_state();
        let mover = standing(1, Side::Home, Position::new(5, 5), 3);
        s.players.insert(mover.id, mover);
        for opt in valid_moves_for(&s, PlayerId(1)) {
            assert!(check_move_legal(&s, PlayerId(1), opt.position).is_ok());
        }
    }

    #[test]
    fn block_targets_are_standing_enemies_only() {
        let mut s = base_state();
        let attacker = standing(1, Side::Home, Position::new(5, 5), 6);
        let enemy = standing(2, Side::Away, Position::new(6, 5), 6);
        let mut prone_enemy = standing(3, Side::Away, Position::new(5, 4), 6);
        prone_enemy.state = PlayerState::Prone;
        s.players.insert(attacker.id, attacker);
        s.players.insert(enemy.id, enemy);
        s.players.insert(prone_enemy.id, prone_enemy);
        let targets = block_targets_for(&s, PlayerId(1));
        assert_eq!(targets, vec![PlayerId(2)]);
    }

    #[test]
    fn formation_requires_three_on_los_and_caps_wide_zones() {
        let mut s = base_state();
        for i in 0..3u32 {
            let p = standing(i + 1, Side::Home, Position::new(12, 5 + i as i32), 6);
            s.players.insert(p.id, p);
        }
        assert!(formation_is_legal(&s, Side::Home));

        let wide1 = standing(10, Side::Home, Position::new(8, 1), 6);
        let wide2 = standing(11, Side::Home, Position::new(8, 2), 6);
        let wide3 = standing(12, Side::Home, Position::new(8, 3), 6);
        s.players.insert(wide1.id, wide1);
        s.players.insert(wide2.id, wide2);
        s.players.insert(wide3.id, wide3);
        assert!(!formation_is_legal(&s, Side::Home));
    }
}
