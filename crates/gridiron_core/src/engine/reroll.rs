//! The reroll arbitrator (spec §4.4) — the single chokepoint every
//! sub-resolver consults for a failing d6 roll. Centralizing it here is
//! what keeps skill-vs-team-reroll precedence consistent across dodge,
//! GFI, pickup, catch and pass-accuracy rolls (Design Note: "Reroll
//! arbitration crosses many sub-resolvers").

use crate::dice::DiceSource;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::PlayerId;
use crate::model::skills::{skill_reroll_for, RollKind, Skill, SkillSet};
use crate::model::team::TeamState;

/// Clamp a computed target number into the legal 2..=6 band.
pub fn clamp_target(target: i32) -> u8 {
    target.clamp(2, 6) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerollSource {
    Skill(Skill),
    Team,
}

#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    pub first_roll: u8,
    pub final_roll: u8,
    pub success: bool,
    pub reroll_used: Option<RerollSource>,
}

/// Attempt a target-number d6 roll with full reroll arbitration.
///
/// `accept_team_reroll` is consulted only once the team reroll is actually
/// eligible (skill reroll unavailable or already spent, rerolls > 0, not yet
/// used this turn, and the team is on turn) — headless simulation callers
/// pass `|| true` since the `Coach` interface (§6) decides actions, not
/// individual reroll prompts.
#[allow(clippy::too_many_arguments)]
pub fn attempt_roll(
    kind: RollKind,
    target: u8,
    player_id: PlayerId,
    skills: &SkillSet,
    team: &mut TeamState,
    team_is_on_turn: bool,
    dice: &mut dyn DiceSource,
    events: &mut EventLog,
    accept_team_reroll: impl FnOnce() -> bool,
) -> Attempt {
    let first = dice.roll_d6();
    if first >= target {
        return Attempt { first_roll: first, final_roll: first, success: true, reroll_used: None };
    }

    // Step 1: skill reroll. A skill reroll may not itself be rerolled —
    // we return unconditionally once it has been consumed.
    if let Some(skill) = skill_reroll_for(skills, kind) {
        let reroll = dice.roll_d6();
        events.push(
            GameEvent::new(EventKind::Reroll, format!("{:?} skill reroll for {:?}", skill, player_id))
                .with("source", format!("{:?}", skill))
                .with("playerId", player_id.0),
        );
        return Attempt {
            first_roll: first,
            final_roll: reroll,
            success: reroll >= target,
            reroll_used: Some(RerollSource::Skill(skill)),
        };
    }

    // Step 2: team reroll, gated by Loner if the player carries it.
    let team_reroll_eligible = team.rerolls > 0 && !team.reroll_used_this_turn && team_is_on_turn;
    if team_reroll_eligible {
        if skills.contains(&Skill::Loner) {
            let loner_check = dice.roll_d6();
            if loner_check < 4 {
                events.push(
                    GameEvent::new(
                        EventKind::Reroll,
                        format!("Loner check failed for {:?}, team reroll refused", player_id),
                    )
                    .with("source", "LonerCheckFailed")
                    .with("playerId", player_id.0),
                );
                return Attempt { first_roll: first, final_roll: first, success: false, reroll_used: None };
            }
        }

        if accept_team_reroll() {
            team.rerolls -= 1;
            team.reroll_used_this_turn = true;
            let reroll = dice.roll_d6();
            events.push(
                GameEvent::new(EventKind::Reroll, format!("team reroll for {:?}", player_id))
                    .with("source", "team")
                    .with("playerId", player_id.0),
            );
            return Attempt {
                first_roll: first,
                final_roll: reroll,
                success: reroll >= target,
                reroll_used: Some(RerollSource::Team),
            };
        }
    }

    // Step 3: failure stands.
    Attempt { first_roll: first, final_roll: first, success: false, reroll_used: None }
}
