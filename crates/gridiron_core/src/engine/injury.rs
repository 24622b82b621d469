//! Injury resolver (spec §4.10): armour→injury cascade, apothecary.

use crate::dice::DiceSource;
use crate::model::event::{EventKind, EventLog, GameEvent};
use crate::model::player::PlayerId;
use crate::model::skills::SkillSet;
use crate::model::team::TeamState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasualtyOutcome {
    Temporary,
    LastingInjury,
    SeriousInjury,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjuryOutcome {
    /// Armour held; player is simply down.
    Unbroken,
    Stunned,
    Ko,
    Casualty(CasualtyOutcome),
}

/// Rolls 2d6 armour vs `armour`, modified by Mighty Blow (+1) and Claw
/// (armour always breaks). If broken, rolls 2d6 on the injury table, with a
/// d6 casualty sub-roll for the 10–12 band. If the owning team has an unused
/// apothecary, `accept_apothecary` is consulted once the result is final and,
/// if accepted, the injury/casualty roll (not the armour roll) is redone.
#[allow(clippy::too_many_arguments)]
pub fn resolve_injury(
    dice: &mut dyn DiceSource,
    attacker_skills: &SkillSet,
    player_id: PlayerId,
    armour: u8,
    team: &mut TeamState,
    events: &mut EventLog,
    accept_apothecary: impl FnOnce(&InjuryOutcome) -> bool,
) -> InjuryOutcome {
    let mighty_blow = attacker_skills.contains(&crate::model::skills::Skill::MightyBlow);
    let claw = attacker_skills.contains(&crate::model::skills::Skill::Claw);

    let (a, b) = dice.roll_2d6();
    let armour_modifier: i32 = if mighty_blow { 1 } else { 0 };
    let armour_total = a as i32 + b as i32 + armour_modifier;
    let broken = claw || armour_total > armour as i32;

    events.push(
        GameEvent::new(EventKind::Armour, format!("armour roll {a}+{b} vs {armour} for {player_id:?}"))
            .with("total", armour_total as i64)
            .with("broken", broken)
            .with("playerId", player_id.0),
    );

    if !broken {
        return InjuryOutcome::Unbroken;
    }

    let mut outcome = roll_injury_table(dice);
    events.push(
        GameEvent::new(EventKind::Injury, format!("injury result {outcome:?} for {player_id:?}"))
            .with("playerId", player_id.0),
    );

    if team.has_apothecary && !team.apothecary_used && accept_apothecary(&outcome) {
        team.apothecary_used = true;
        outcome = roll_injury_table(dice);
        events.push(
            GameEvent::new(EventKind::Injury, format!("apothecary re-roll: {outcome:?} for {player_id:?}"))
                .with("source", "apothecary")
                .with("playerId", player_id.0),
        );
    }

    outcome
}

fn roll_injury_table(dice: &mut dyn DiceSource) -> InjuryOutcome {
    let (c, d) = dice.roll_2d6();
    match c + d {
        2..=7 => InjuryOutcome::Stunned,
        8..=9 => InjuryOutcome::Ko,
        10..=12 => InjuryOutcome::Casualty(match dice.roll_d6() {
            1 | 2 => CasualtyOutcome::Temporary,
            3 | 4 => CasualtyOutcome::LastingInjury,
            5 => CasualtyOutcome::SeriousInjury,
            _ => CasualtyOutcome::Dead,
        }),
        _ => unreachable!("2d6 sum is always 2..=12"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::geometry::Side;

    #[test]
    fn armour_holds_when_roll_is_below_armour_value() {
        let mut dice = ScriptedDice::new().with_d6([1, 2]);
        let skills = SkillSet::new();
        let mut team = TeamState::new("home", "Home", "humans", Side::Home);
        let mut events = EventLog::new();
        let outcome = resolve_injury(&mut dice, &skills, PlayerId(1), 9, &mut team, &mut events, |_| true);
        assert_eq!(outcome, InjuryOutcome::Unbroken);
    }

    #[test]
    fn broken_armour_cascades_to_injury_table() {
        let mut dice = ScriptedDice::new().with_d6([6, 6, 3, 3]);
        let skills = SkillSet::new();
        let mut team = TeamState::new("home", "Home", "humans", Side::Home);
        let mut events = EventLog::new();
        let outcome = resolve_injury(&mut dice, &skills, PlayerId(1), 8, &mut team, &mut events, |_| false);
        assert_eq!(outcome, InjuryOutcome::Stunned);
    }

    #[test]
    fn claw_always_breaks_armour() {
        let mut dice = ScriptedDice::new().with_d6([1, 1, 1, 1]);
        let mut skills = SkillSet::new();
        skills.insert(crate::model::skills::Skill::Claw);
        let mut team = TeamState::new("home", "Home", "humans", Side::Home);
        let mut events = EventLog::new();
        let outcome = resolve_injury(&mut dice, &skills, PlayerId(1), 10, &mut team, &mut events, |_| false);
        assert_eq!(outcome, InjuryOutcome::Stunned);
    }

    #[test]
    fn apothecary_rerolls_a_casualty_once() {
        // first injury roll: 6+6=12 -> casualty, d6=6 -> dead.
        // apothecary re-roll: 1+1=2 -> stunned.
        let mut dice = ScriptedDice::new().with_d6([6, 6, 6, 6, 6, 1, 1]);
        let skills = SkillSet::new();
        let mut team = TeamState::new("home", "Home", "humans", Side::Home);
        let mut events = EventLog::new();
        let outcome = resolve_injury(&mut dice, &skills, PlayerId(1), 1, &mut team, &mut events, |_| true);
        assert_eq!(outcome, InjuryOutcome::Stunned);
        assert!(team.apothecary_used);
    }
}
