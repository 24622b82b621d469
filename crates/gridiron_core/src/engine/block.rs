//! Block resolver (spec §4.6): dice selection, push/follow, armor+injury.

use crate::dice::{BlockDie, DiceSource};
use crate::engine::ball_resolver::drop_ball;
use crate::engine::injury::{resolve_injury, CasualtyOutcome, InjuryOutcome};
use crate::engine::strength::{dice_chooser, effective_strengths, block_dice_count, DiceChooser};
use crate::geometry::{Position, Side, DIRECTIONS_8};
use crate::model::ball::Ball;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::{PlayerId, PlayerState};
use crate::model::skills::{Skill, SkillSet};
use crate::state::GameState;

fn attacker_rank(die: BlockDie) -> i32 {
    match die {
        BlockDie::DefenderDown => 5,
        BlockDie::DefenderStumbles => 4,
        BlockDie::Push => 3,
        BlockDie::BothDown => 2,
        BlockDie::AttackerDown => 1,
    }
}

fn pick_die(rolled: &[BlockDie], chooser: DiceChooser) -> BlockDie {
    match chooser {
        DiceChooser::Attacker => *rolled.iter().max_by_key(|d| attacker_rank(**d)).expect("at least one block die"),
        DiceChooser::Defender => *rolled.iter().min_by_key(|d| attacker_rank(**d)).expect("at least one block die"),
    }
}

fn roll_and_choose(dice: &mut dyn DiceSource, count: u8, chooser: DiceChooser) -> (Vec<BlockDie>, BlockDie) {
    let rolled = dice.roll_block_dice(count);
    let chosen = pick_die(&rolled, chooser);
    (rolled, chosen)
}

/// Resolves a declared BLOCK/BLITZ/MULTIPLE_BLOCK pair once legality
/// (attacker standing and adjacent, target a standing enemy) has already
/// been checked by the caller. Returns whether the block caused a turnover.
///
/// Block dice have no skill-reroll entry in the `(Skill, RollKind)` table
/// (§4.4) — only a team reroll of the whole rolled set applies, so this
/// consults the team-reroll resource directly rather than through
/// [`crate::engine::reroll::attempt_roll`], which is built around a single
/// target-number d6.
pub fn resolve_block(
    state: &mut GameState,
    attacker_id: PlayerId,
    defender_id: PlayerId,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
    accept_apothecary: impl Fn(&InjuryOutcome) -> bool,
) -> bool {
    let (attacker_side, attacker_pos, attacker_skills) = {
        let p = state.player(attacker_id).expect("block: attacker must exist");
        (p.team_side, p.position.expect("block: attacker must be on pitch"), p.skills.clone())
    };
    let (defender_side, defender_skills) = {
        let p = state.player(defender_id).expect("block: defender must exist");
        (p.team_side, p.skills.clone())
    };

    let (attack_strength, defend_strength) = effective_strengths(state, attacker_id, defender_id);
    let dice_count = block_dice_count(attack_strength, defend_strength);
    let chooser = dice_chooser(attack_strength, defend_strength);

    let (mut rolled, mut chosen) = roll_and_choose(dice, dice_count, chooser);
    events.push(
        GameEvent::new(EventKind::Block, format!("{attacker_id:?} blocks {defender_id:?}: {rolled:?}"))
            .with("playerId", attacker_id.0)
            .with("targetId", defender_id.0),
    );

    let unhappy_with_result = matches!(chosen, BlockDie::AttackerDown | BlockDie::BothDown);
    let reroll_eligible = {
        let team = state.team(attacker_side);
        team.rerolls > 0 && !team.reroll_used_this_turn
    };
    if unhappy_with_result && reroll_eligible && accept_team_reroll() {
        let team = state.team_mut(attacker_side);
        team.rerolls -= 1;
        team.reroll_used_this_turn = true;
        events.push(
            GameEvent::new(EventKind::Reroll, "team reroll of block dice")
                .with("source", "team")
                .with("playerId", attacker_id.0),
        );
        let (rolled2, chosen2) = roll_and_choose(dice, dice_count, chooser);
        rolled = rolled2;
        chosen = chosen2;
    }
    let _ = rolled;

    let mut turnover = false;
    match chosen {
        BlockDie::AttackerDown => {
            knock_down(state, attacker_id, dice, events);
            injure(state, attacker_side, attacker_id, &SkillSet::new(), dice, events, &accept_apothecary);
            turnover = true;
        }
        BlockDie::BothDown => {
            if !attacker_skills.contains(&Skill::Block) {
                knock_down(state, attacker_id, dice, events);
                injure(state, attacker_side, attacker_id, &SkillSet::new(), dice, events, &accept_apothecary);
                turnover = true;
            }
            knock_down(state, defender_id, dice, events);
            injure(state, defender_side, defender_id, &attacker_skills, dice, events, &accept_apothecary);
        }
        BlockDie::Push => {
            push_chain(state, attacker_pos, defender_id, dice, events, 0);
        }
        BlockDie::DefenderStumbles => {
            push_chain(state, attacker_pos, defender_id, dice, events, 0);
            if !defender_skills.contains(&Skill::Dodge) {
                knock_down(state, defender_id, dice, events);
                injure(state, defender_side, defender_id, &attacker_skills, dice, events, &accept_apothecary);
            }
        }
        BlockDie::DefenderDown => {
            push_chain(state, attacker_pos, defender_id, dice, events, 0);
            knock_down(state, defender_id, dice, events);
            injure(state, defender_side, defender_id, &attacker_skills, dice, events, &accept_apothecary);
        }
    }
    turnover
}

pub(crate) fn knock_down(state: &mut GameState, player_id: PlayerId, dice: &mut dyn DiceSource, events: &mut EventLog) {
    let pos = state.player(player_id).and_then(|p| p.position);
    let was_carrier = state.ball() == Ball::Held(player_id);
    if let Some(p) = state.player_mut(player_id) {
        p.state = PlayerState::Prone;
    }
    events.push(GameEvent::new(EventKind::KnockedDown, format!("{player_id:?} is knocked down")).with("playerId", player_id.0));
    if was_carrier {
        if let Some(pos) = pos {
            drop_ball(state, pos, dice, events);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn injure(
    state: &mut GameState,
    side: Side,
    player_id: PlayerId,
    attacker_skills: &SkillSet,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_apothecary: &impl Fn(&InjuryOutcome) -> bool,
) {
    let armour = state.player(player_id).map(|p| p.stats.armour).unwrap_or(8);
    let team = state.team_mut(side);
    let outcome = resolve_injury(dice, attacker_skills, player_id, armour, team, events, |o| accept_apothecary(o));
    if let Some(p) = state.player_mut(player_id) {
        p.state = match outcome {
            InjuryOutcome::Unbroken => PlayerState::Prone,
            InjuryOutcome::Stunned => PlayerState::Stunned,
            InjuryOutcome::Ko => PlayerState::Ko,
            InjuryOutcome::Casualty(CasualtyOutcome::Dead) => PlayerState::Dead,
            InjuryOutcome::Casualty(_) => PlayerState::Injured,
        };
        if !p.state.is_on_pitch() {
            p.position = None;
        }
    }
}

/// The three candidate push squares "behind" the defender relative to the
/// attacker: the direction continuing the attacker→defender line, and its
/// two 45°-adjacent neighbors in [`DIRECTIONS_8`]'s fixed clockwise order.
fn push_directions(attacker_pos: Position, defender_pos: Position) -> [(i32, i32); 3] {
    let delta = (
        (defender_pos.x - attacker_pos.x).signum(),
        (defender_pos.y - attacker_pos.y).signum(),
    );
    let idx = DIRECTIONS_8.iter().position(|&d| d == delta).unwrap_or(0);
    let n = DIRECTIONS_8.len();
    [DIRECTIONS_8[(idx + n - 1) % n], DIRECTIONS_8[idx], DIRECTIONS_8[(idx + 1) % n]]
}

/// Pushes `player_id` one square away from `from_pos`, cascading into any
/// occupant of the chosen square first. Depth-capped at 3 to bound runaway
/// chains on a crowded pitch; a player with nowhere to go stands its ground.
fn push_chain(
    state: &mut GameState,
    from_pos: Position,
    player_id: PlayerId,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    depth: u8,
) {
    if depth > 2 {
        return;
    }
    let player_pos = match state.player(player_id).and_then(|p| p.position) {
        Some(p) => p,
        None => return,
    };

    for (dx, dy) in push_directions(from_pos, player_pos) {
        let dest = player_pos.translated(dx, dy);
        if !dest.is_on_pitch() {
            continue;
        }
        if let Some(occupant) = state.player_at(dest) {
            let occupant_id = occupant.id;
            push_chain(state, player_pos, occupant_id, dice, events, depth + 1);
        }
        if state.player_at(dest).is_none() {
            if let Some(p) = state.player_mut(player_id) {
                p.position = Some(dest);
            }
            events.push(GameEvent::new(EventKind::Block, format!("{player_id:?} pushed to {dest:?}")).with("playerId", player_id.0));
            return;
        }
    }
}
