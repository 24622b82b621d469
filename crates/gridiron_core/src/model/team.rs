//! Team-level state: score, rerolls, per-turn resource flags (spec §3).

use serde::{Deserialize, Serialize};

use crate::geometry::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub team_id: String,
    pub name: String,
    pub race: String,
    pub side: Side,
    pub score: u8,
    pub rerolls: u8,
    pub reroll_used_this_turn: bool,
    /// 1..=8 per half.
    pub turn_number: u8,
    pub blitz_used_this_turn: bool,
    pub pass_used_this_turn: bool,
    pub foul_used_this_turn: bool,
    pub has_apothecary: bool,
    pub apothecary_used: bool,
}

impl TeamState {
    pub fn new(team_id: impl Into<String>, name: impl Into<String>, race: impl Into<String>, side: Side) -> Self {
        Self {
            team_id: team_id.into(),
            name: name.into(),
            race: race.into(),
            side,
            score: 0,
            rerolls: 3,
            reroll_used_this_turn: false,
            turn_number: 1,
            blitz_used_this_turn: false,
            pass_used_this_turn: false,
            foul_used_this_turn: false,
            has_apothecary: true,
            apothecary_used: false,
        }
    }

    pub fn reset_turn_flags(&mut self) {
        self.reroll_used_this_turn = false;
        self.blitz_used_this_turn = false;
        self.pass_used_this_turn = false;
        self.foul_used_this_turn = false;
    }

    /// §3 invariant 6: crossing turn 8 triggers half/game end.
    pub fn has_finished_half(&self) -> bool {
        self.turn_number > 8
    }
}
