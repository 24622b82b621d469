//! Player identity, stats, state and per-turn bookkeeping (spec §3).

use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Side};
use crate::model::skills::SkillSet;

/// Opaque player identifier, unique within a match. Small integer rather
/// than a `Uuid` — rosters never exceed 22 players in a single match, and a
/// dense index keeps `GameState::players` cheap to hash and to diff in
/// tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Standing,
    Prone,
    Stunned,
    Ko,
    Injured,
    Dead,
    Ejected,
    OffPitch,
}

impl PlayerState {
    /// "On pitch" = {standing, prone, stunned} per spec §3.
    pub fn is_on_pitch(self) -> bool {
        matches!(self, PlayerState::Standing | PlayerState::Prone | PlayerState::Stunned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub movement: u8,
    pub strength: u8,
    pub agility: u8,
    pub armour: u8,
}

/// Per-turn flags, reset by the game-flow resolver at end of turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnFlags {
    pub has_moved: bool,
    pub has_acted: bool,
    pub movement_remaining: u8,
    pub lost_tacklezones: bool,
    pub pro_used_this_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_side: Side,
    pub name: String,
    pub number: u8,
    pub positional_name: String,
    pub stats: PlayerStats,
    pub skills: SkillSet,
    pub state: PlayerState,
    pub position: Option<Position>,
    pub flags: TurnFlags,
}

impl Player {
    pub fn new(
        id: PlayerId,
        team_side: Side,
        name: impl Into<String>,
        number: u8,
        positional_name: impl Into<String>,
        stats: PlayerStats,
        skills: SkillSet,
    ) -> Self {
        Self {
            id,
            team_side,
            name: name.into(),
            number,
            positional_name: positional_name.into(),
            stats,
            skills,
            state: PlayerState::OffPitch,
            position: None,
            flags: TurnFlags::default(),
        }
    }

    pub fn is_on_pitch(&self) -> bool {
        let state_on_pitch = self.state.is_on_pitch();
        debug_assert_eq!(
            state_on_pitch,
            self.position.is_some(),
            "PlayerState on-pitch-ness must agree with Option<Position> for {:?}",
            self.id
        );
        state_on_pitch
    }

    pub fn is_standing(&self) -> bool {
        self.state == PlayerState::Standing
    }

    pub fn has_tacklezone(&self) -> bool {
        self.is_standing()
            && !self.flags.lost_tacklezones
            && !self.skills.contains(&crate::model::skills::Skill::Titchy)
    }

    pub fn reset_turn_flags(&mut self) {
        self.flags = TurnFlags {
            movement_remaining: self.stats.movement,
            ..TurnFlags::default()
        };
    }
}
