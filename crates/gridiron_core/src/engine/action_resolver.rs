//! Action resolver (spec §4.13): the single public entry point. Validates a
//! requested [`Action`] via the rules engine, dispatches to the matching
//! sub-resolver, then runs the post-hooks in the fixed order the spec
//! requires — touchdown check, turnover handling, phase transitions, player
//! flag bookkeeping — before folding everything into an [`ActionResult`].

use crate::dice::DiceSource;
use crate::engine::ball_resolver::attempt_catch;
use crate::engine::block::{injure, resolve_block};
use crate::engine::game_flow;
use crate::engine::injury::InjuryOutcome;
use crate::engine::kickoff::resolve_kickoff;
use crate::engine::movement::resolve_move;
use crate::engine::pass_resolver::{resolve_pass, PassOutcome};
use crate::engine::rules::{self, Action};
use crate::error::EngineError;
use crate::geometry::Position;
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::PlayerId;
use crate::state::{GameState, Phase};

pub use crate::engine::rules::Action as ActionRequest;

#[derive(Debug, Clone)]
pub struct ActionResult {
    pub new_state: GameState,
    pub success: bool,
    pub turnover: bool,
    pub events: Vec<GameEvent>,
    pub error: Option<EngineError>,
}

impl ActionResult {
    fn illegal(state: &GameState, error: EngineError) -> Self {
        Self { new_state: state.clone(), success: false, turnover: false, events: Vec::new(), error: Some(error) }
    }
}

/// Top-level dispatch. `accept_team_reroll`/`accept_apothecary` are the
/// coach-facing prompts every sub-resolver funnels reroll/apothecary
/// decisions through; headless simulation callers typically pass `|| true`
/// or a `Coach`-backed policy.
pub fn resolve(
    state: &GameState,
    action: Action,
    dice: &mut dyn DiceSource,
    accept_team_reroll: impl Fn() -> bool + Copy,
    accept_apothecary: impl Fn(&InjuryOutcome) -> bool + Copy,
) -> ActionResult {
    let mut working = state.clone();
    let mut events = EventLog::new();

    let dispatch_turnover = match dispatch(&mut working, action, dice, &mut events, accept_team_reroll, accept_apothecary) {
        Ok(turnover) => turnover,
        Err(e) => return ActionResult::illegal(state, e),
    };

    run_post_hooks(&mut working, dispatch_turnover, dice, &mut events);
    working.assert_invariants();

    ActionResult {
        new_state: working,
        success: true,
        turnover: dispatch_turnover,
        events: events.into_vec(),
        error: None,
    }
}

fn dispatch(
    working: &mut GameState,
    action: Action,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl Fn() -> bool + Copy,
    accept_apothecary: impl Fn(&InjuryOutcome) -> bool + Copy,
) -> crate::error::Result<bool> {
    match action {
        Action::SetupPlayer { player_id, x, y } => {
            let dest = Position::new(x, y);
            rules::check_setup_player_legal(working, player_id, dest)?;
            let movement = working.player(player_id).expect("checked above").stats.movement;
            if let Some(p) = working.player_mut(player_id) {
                p.state = crate::model::player::PlayerState::Standing;
                p.position = Some(dest);
                p.flags.movement_remaining = movement;
            }
            events.push(GameEvent::new(EventKind::Move, format!("{player_id:?} set up at {dest:?}")).with("playerId", player_id.0));
            Ok(false)
        }

        Action::EndSetup => {
            let side = working.active_team();
            if !rules::formation_is_legal(working, side) {
                return Err(EngineError::InvalidFormation(format!(
                    "{side:?} needs at least 3 on the line of scrimmage and at most 2 per wide zone"
                )));
            }
            let opponent = side.opponent();
            let opponent_already_set_up = working.players_on_pitch(opponent).count() > 0;
            if opponent_already_set_up {
                let kicking = working.kicking_team();
                working.set_phase(Phase::Kickoff);
                resolve_kickoff(working, None, dice, events, |_, _| {});
                working.set_phase(Phase::Play);
                working.set_active_team(kicking.opponent());
            } else {
                working.set_active_team(opponent);
            }
            Ok(false)
        }

        Action::Move { player_id, x, y } => {
            let dest = Position::new(x, y);
            rules::check_move_legal(working, player_id, dest)?;
            let result = resolve_move(working, player_id, dest, dice, events, accept_team_reroll);
            Ok(result.turnover)
        }

        Action::Block { player_id, target_id } => {
            rules::check_block_legal(working, player_id, target_id, false)?;
            let turnover = resolve_block(working, player_id, target_id, dice, events, accept_team_reroll, accept_apothecary);
            mark_acted(working, player_id);
            Ok(turnover)
        }

        Action::Blitz { player_id, target_id } => {
            rules::check_block_legal(working, player_id, target_id, true)?;
            let turnover = resolve_block(working, player_id, target_id, dice, events, accept_team_reroll, accept_apothecary);
            mark_acted(working, player_id);
            if let Some(p) = working.player_mut(player_id) {
                p.flags.has_moved = true;
            }
            working.team_mut(working.active_team()).blitz_used_this_turn = true;
            Ok(turnover)
        }

        Action::MultipleBlock { player_id, target_id, target_id2 } => {
            rules::check_multiple_block_legal(working, player_id, target_id, target_id2)?;
            let t1 = resolve_block(working, player_id, target_id, dice, events, accept_team_reroll, accept_apothecary);
            let t2 = resolve_block(working, player_id, target_id2, dice, events, accept_team_reroll, accept_apothecary);
            mark_acted(working, player_id);
            Ok(t1 || t2)
        }

        Action::Pass { player_id, target_x, target_y } => {
            let target = Position::new(target_x, target_y);
            rules::check_pass_legal(working, player_id, target)?;
            let outcome = resolve_pass(working, player_id, target, dice, events, accept_team_reroll);
            mark_acted(working, player_id);
            working.team_mut(working.active_team()).pass_used_this_turn = true;
            Ok(matches!(outcome, PassOutcome::Fumble | PassOutcome::Intercepted(_)))
        }

        Action::HandOff { player_id, target_id } => {
            rules::check_handoff_legal(working, player_id, target_id)?;
            let receiver_pos = working.player(target_id).and_then(|p| p.position).expect("checked above");
            working.set_ball(Ball::OnGround(receiver_pos));
            let caught = attempt_catch(working, target_id, true, dice, events, accept_team_reroll);
            mark_acted(working, player_id);
            Ok(!caught)
        }

        Action::Foul { player_id, target_id } => {
            rules::check_foul_legal(working, player_id, target_id)?;
            let attacker_skills = working.player(player_id).expect("checked above").skills.clone();
            let defender_side = working.player(target_id).expect("checked above").team_side;
            injure(working, defender_side, target_id, &attacker_skills, dice, events, &accept_apothecary);
            mark_acted(working, player_id);
            working.team_mut(working.active_team()).foul_used_this_turn = true;
            Ok(false)
        }

        Action::EndTurn => {
            game_flow::end_turn(working, dice, events);
            Ok(false)
        }
    }
}

fn mark_acted(working: &mut GameState, player_id: PlayerId) {
    if let Some(p) = working.player_mut(player_id) {
        p.flags.has_acted = true;
    }
}

/// Post-hooks, in the order the spec fixes: touchdown check, turnover
/// handling, phase transitions (folded into touchdown/turnover above),
/// player flag bookkeeping (folded into each dispatch arm that needs it).
fn run_post_hooks(working: &mut GameState, turnover: bool, dice: &mut dyn DiceSource, events: &mut EventLog) {
    if let Some(side) = game_flow::check_touchdown(working) {
        game_flow::resolve_touchdown(working, side, events);
        return;
    }
    if turnover {
        game_flow::apply_turnover(working, dice, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::geometry::Side;
    use crate::model::player::{Player, PlayerState, PlayerStats};
    use crate::model::skills::{Skill, SkillSet};
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

    fn standing(id: u32, side: Side, pos: Position, agility: u8) -> Player {
        let stats = PlayerStats { movement: 6, strength: 3, agility, armour: 8 };
        let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
        p.state = PlayerState::Standing;
        p.position = Some(pos);
        p.flags.movement_remaining = 6;
        p
    }

    #[test]
    fn illegal_move_does_not_mutate_state() {
        let mut s = base_state();
        let mover = standing(1, Side::Away, Position::new(5, 5), 3);
        s.players.insert(mover.id, mover);
        let mut dice = ScriptedDice::new();
        let result = resolve(
            &s,
            Action::Move { player_id: PlayerId(1), x: 6, y: 5 },
            &mut dice,
            || true,
            |_| false,
        );
        assert!(!result.success);
        assert!(result.events.is_empty());
        assert!(matches!(result.error, Some(EngineError::NotActiveTeam(_))));
    }

    #[test]
    fn dodge_skill_reroll_saves_a_move_end_to_end() {
        let mut s = base_state();
        let mut skills = SkillSet::new();
        skills.insert(Skill::Dodge);
        let mut mover = standing(1, Side::Home, Position::new(5, 5), 3);
        mover.skills = skills;
        let enemy = standing(2, Side::Away, Position::new(5, 4), 3);
        s.players.insert(mover.id, mover);
        s.players.insert(enemy.id, enemy);
        let mut dice = ScriptedDice::new().with_d6([2, 4]);
        let result = resolve(&s, Action::Move { player_id: PlayerId(1), x: 5, y: 6 }, &mut dice, || true, |_| false);
        assert!(result.success);
        assert!(!result.turnover);
        assert_eq!(result.new_state.player(PlayerId(1)).unwrap().position, Some(Position::new(5, 6)));
        assert!(result.events.iter().any(|e| e.kind == EventKind::Reroll));
    }

    #[test]
    fn carrier_move_into_end_zone_scores_and_resets_to_setup() {
        let mut s = base_state();
        let mut mover = standing(1, Side::Home, Position::new(24, 7), 3);
        mover.flags.movement_remaining = 6;
        s.players.insert(mover.id, mover);
        s.set_ball(Ball::Held(PlayerId(1)));
        let mut dice = ScriptedDice::new();
        let result = resolve(&s, Action::Move { player_id: PlayerId(1), x: 25, y: 7 }, &mut dice, || true, |_| false);
        assert!(result.success);
        assert_eq!(result.new_state.team(Side::Home).score, 1);
        assert_eq!(result.new_state.phase(), Phase::Setup);
    }

    #[test]
    fn end_turn_at_turn_eight_of_second_half_ends_the_game() {
        let mut s = base_state();
        s.set_half(2);
        s.team_mut(Side::Home).turn_number = 8;
        s.team_mut(Side::Away).turn_number = 8;
        let mut dice = ScriptedDice::new();
        let result = resolve(&s, Action::EndTurn, &mut dice, || true, |_| false);
        assert!(result.success);
        assert_eq!(result.new_state.phase(), Phase::GameOver);
    }

    #[test]
    fn attacker_down_block_is_a_turnover() {
        let mut s = base_state();
        let attacker = standing(1, Side::Home, Position::new(5, 5), 3);
        let defender = standing(2, Side::Away, Position::new(6, 5), 3);
        s.players.insert(attacker.id, attacker);
        s.players.insert(defender.id, defender);
        let mut dice = crate::dice::ScriptedDice::new()
            .with_block([crate::dice::BlockDie::AttackerDown])
            .with_d6([4, 4]);
        let result = resolve(&s, Action::Block { player_id: PlayerId(1), target_id: PlayerId(2) }, &mut dice, || false, |_| false);
        assert!(result.success);
        assert!(result.turnover);
        assert_ne!(result.new_state.active_team(), Side::Home);
    }

    #[test]
    fn valid_moves_for_always_dispatch_successfully() {
        let mut s = base_state();
        let mover = standing(1, Side::Home, Position::new(5, 5), 3);
        s.players.insert(mover.id, mover);
        for opt in rules::valid_moves_for(&s, PlayerId(1)) {
            let mut dice = ScriptedDice::new().with_d6(vec![6; 10]);
            let result = resolve(
                &s,
                Action::Move { player_id: PlayerId(1), x: opt.position.x, y: opt.position.y },
                &mut dice,
                || true,
                |_| false,
            );
            assert!(result.success, "{:?} should have dispatched without IllegalAction", opt.position);
        }
    }
}
