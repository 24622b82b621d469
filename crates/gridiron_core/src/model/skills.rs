//! The finite skill set. Skills dispatch via exhaustive `match`, not a class
//! hierarchy (Design Note "Dynamic dispatch over skills") — a skill is a tag,
//! and its effect lives at each call site that cares about it (reroll
//! arbitration, dodge target modifiers, tacklezone projection, ...).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Skill {
    Dodge,
    SureHands,
    Catch,
    Pass,
    Block,
    MultipleBlock,
    Titchy,
    Stunty,
    BreakTackle,
    MightyBlow,
    Claw,
    Pro,
    Loner,
}

pub type SkillSet = HashSet<Skill>;

/// The kind of roll a reroll can apply to — the other half of the
/// `(Skill, RollKind)` lookup key the reroll arbitrator indexes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollKind {
    Dodge,
    Gfi,
    Pickup,
    Catch,
    PassAccuracy,
    ArmourOrInjury,
    Block,
}

/// The skill that grants a reroll for a given roll kind, if any. A skill
/// reroll "may not itself be rerolled" — callers consult this once per
/// failure, not recursively.
pub fn skill_reroll_for(skills: &SkillSet, kind: RollKind) -> Option<Skill> {
    let candidate = match kind {
        RollKind::Dodge => Skill::Dodge,
        RollKind::Pickup => Skill::SureHands,
        RollKind::Catch => Skill::Catch,
        RollKind::PassAccuracy => Skill::Pass,
        RollKind::Gfi | RollKind::ArmourOrInjury | RollKind::Block => return None,
    };
    skills.contains(&candidate).then_some(candidate)
}
